use gensim_error::{GensimError, GensimResult};

use crate::subpopulation::Subpopulation;

/// The full set of subpopulations a species currently carries (spec §3
/// "Species... owns the population (subpopulations, individuals)"). Kept as
/// an insertion-ordered vector rather than a hash map — models rarely carry
/// more than a handful of subpopulations, and iteration order matters for
/// deterministic tick output.
#[derive(Default)]
pub struct Population {
    subpops: Vec<Subpopulation>,
}

impl Population {
    pub fn new() -> Self {
        Population { subpops: Vec::new() }
    }

    pub fn add_subpopulation(&mut self, subpop: Subpopulation) {
        self.subpops.push(subpop);
    }

    pub fn remove_subpopulation(&mut self, id: u32) -> Option<Subpopulation> {
        let index = self.subpops.iter().position(|s| s.id() == id)?;
        Some(self.subpops.remove(index))
    }

    pub fn get(&self, id: u32) -> GensimResult<&Subpopulation> {
        self.subpops
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| GensimError::invariant(format!("no subpopulation with id {id}")))
    }

    pub fn get_mut(&mut self, id: u32) -> GensimResult<&mut Subpopulation> {
        self.subpops
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| GensimError::invariant(format!("no subpopulation with id {id}")))
    }

    pub fn subpopulations(&self) -> &[Subpopulation] {
        &self.subpops
    }

    pub fn subpopulations_mut(&mut self) -> &mut [Subpopulation] {
        &mut self.subpops
    }

    pub fn total_size(&self) -> usize {
        self.subpops.iter().map(|s| s.size()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subpops.iter().all(|s| s.size() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_size_sums_every_subpopulation() {
        let mut population = Population::new();
        population.add_subpopulation(Subpopulation::new(0, "p0"));
        population.add_subpopulation(Subpopulation::new(1, "p1"));
        assert_eq!(population.total_size(), 0);
        assert!(population.get(0).is_ok());
        assert!(population.get(7).is_err());
    }
}

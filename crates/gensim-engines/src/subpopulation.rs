use gensim_error::{GensimError, GensimResult};

use crate::individual::Individual;
use crate::wheel::ProbabilityWheelIterator;

/// One deme: a named group of [`Individual`]s sharing a reproduction pool
/// (spec §3 "Species... owns the population (subpopulations, individuals)").
pub struct Subpopulation {
    id: u32,
    name: String,
    individuals: Vec<Individual>,
    /// Fraction of offspring drawn as male in a sexual model; `None` for a
    /// hermaphroditic one (spec §4.10 step 2 draws a sex per offspring
    /// before sampling its parents' sex-specific rate maps).
    sex_ratio: Option<f64>,
    avoid_selfing: bool,
}

impl Subpopulation {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Subpopulation {
            id,
            name: name.into(),
            individuals: Vec::new(),
            sex_ratio: None,
            avoid_selfing: false,
        }
    }

    pub fn with_sex_ratio(mut self, male_fraction: f64) -> Self {
        self.sex_ratio = Some(male_fraction);
        self
    }

    pub fn avoiding_selfing(mut self, avoid: bool) -> Self {
        self.avoid_selfing = avoid;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sex_ratio(&self) -> Option<f64> {
        self.sex_ratio
    }

    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    pub fn take_individuals(&mut self) -> Vec<Individual> {
        std::mem::take(&mut self.individuals)
    }

    pub fn set_individuals(&mut self, individuals: Vec<Individual>) {
        self.individuals = individuals;
    }

    fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().map(|i| i.fitness()).collect()
    }

    /// Draws one parent pair from the current generation's fitness-weighted
    /// distribution (spec §4.10 step 2). Retries once against self-fertilization
    /// when `avoid_selfing` is set and a lone individual isn't the only
    /// candidate; a subpopulation of size one always selfs regardless.
    pub fn sample_parent_pair(&self) -> GensimResult<(usize, usize)> {
        if self.individuals.is_empty() {
            return Err(GensimError::invariant("cannot sample parents from an empty subpopulation"));
        }
        let weights = self.fitness_values();
        let mut draws = ProbabilityWheelIterator::new(&weights, 2);
        let first = draws.next().expect("count=2 always yields a first draw");
        let mut second = draws.next().expect("count=2 always yields a second draw");

        if self.avoid_selfing && self.individuals.len() > 1 {
            let mut attempts = 0;
            while second == first && attempts < 8 {
                second = ProbabilityWheelIterator::new(&weights, 1).next().expect("count=1 always yields a draw");
                attempts += 1;
            }
        }

        Ok((first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sex::Sex;
    use gensim_core::prelude::Haplosome;

    fn individual_with_fitness(id: u64, fitness: f64) -> Individual {
        let mut ind = Individual::new(id, 0, Sex::Hermaphrodite, -1, -1, vec![Haplosome::new_null(0)]);
        ind.set_fitness(fitness);
        ind
    }

    #[test]
    fn sampling_from_empty_subpopulation_errors() {
        let subpop = Subpopulation::new(0, "p0");
        assert!(subpop.sample_parent_pair().is_err());
    }

    #[test]
    fn single_individual_always_selfs() {
        let mut subpop = Subpopulation::new(0, "p0");
        subpop.push(individual_with_fitness(0, 1.0));
        let (a, b) = subpop.sample_parent_pair().unwrap();
        assert_eq!((a, b), (0, 0));
    }

    #[test]
    fn zero_fitness_individual_is_never_sampled() {
        let mut subpop = Subpopulation::new(0, "p0");
        subpop.push(individual_with_fitness(0, 0.0));
        subpop.push(individual_with_fitness(1, 1.0));
        for _ in 0..50 {
            let (a, b) = subpop.sample_parent_pair().unwrap();
            assert_eq!(a, 1);
            assert_eq!(b, 1);
        }
    }
}

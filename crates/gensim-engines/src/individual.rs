use gensim_error::{GensimError, GensimResult};
use gensim_core::prelude::Haplosome;

use crate::sex::Sex;

/// One organism in a [`crate::subpopulation::Subpopulation`] (spec §3
/// "Individuals live in Subpopulations"). Carries exactly two
/// [`Haplosome`]s per chromosome the species defines — sex chromosomes and
/// unmodeled copies use the `Null` haplosome state rather than being
/// omitted, so haplosome indices stay stable across individuals of
/// different sex (spec §3 "Haplosome": "a null haplosome... occupies a
/// defined slot").
pub struct Individual {
    pedigree_id: u64,
    subpop_id: u32,
    sex: Sex,
    age: i32,
    parent1_pedigree_id: i64,
    parent2_pedigree_id: i64,
    haplosomes: Vec<Haplosome>,
    /// Per-chromosome pair of tree-sequence node ids, populated only when
    /// the species records a tree sequence (spec §4.9 "two nodes per
    /// chromosome per individual, invariant").
    nodes: Vec<(u64, u64)>,
    fitness: f64,
}

impl Individual {
    pub fn new(
        pedigree_id: u64,
        subpop_id: u32,
        sex: Sex,
        parent1_pedigree_id: i64,
        parent2_pedigree_id: i64,
        haplosomes: Vec<Haplosome>,
    ) -> Self {
        Individual {
            pedigree_id,
            subpop_id,
            sex,
            age: 0,
            parent1_pedigree_id,
            parent2_pedigree_id,
            haplosomes,
            nodes: Vec::new(),
            fitness: 1.0,
        }
    }

    pub fn pedigree_id(&self) -> u64 {
        self.pedigree_id
    }

    pub fn subpop_id(&self) -> u32 {
        self.subpop_id
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn advance_age(&mut self) {
        self.age += 1;
    }

    pub fn parent1_pedigree_id(&self) -> i64 {
        self.parent1_pedigree_id
    }

    pub fn parent2_pedigree_id(&self) -> i64 {
        self.parent2_pedigree_id
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub fn haplosomes(&self) -> &[Haplosome] {
        &self.haplosomes
    }

    pub fn haplosomes_mut(&mut self) -> &mut [Haplosome] {
        &mut self.haplosomes
    }

    /// `copy` is 0 or 1 — the two haplosome copies a diploid individual
    /// carries for `chromosome_index` (spec §3: "a diploid individual has
    /// two `Haplosome`s per autosome").
    pub fn haplosome(&self, chromosome_index: usize, copy: usize) -> GensimResult<&Haplosome> {
        self.haplosomes
            .get(chromosome_index * 2 + copy)
            .ok_or_else(|| GensimError::invariant(format!("no haplosome slot for chromosome {chromosome_index} copy {copy}")))
    }

    pub fn haplosome_mut(&mut self, chromosome_index: usize, copy: usize) -> GensimResult<&mut Haplosome> {
        self.haplosomes
            .get_mut(chromosome_index * 2 + copy)
            .ok_or_else(|| GensimError::invariant(format!("no haplosome slot for chromosome {chromosome_index} copy {copy}")))
    }

    pub fn nodes(&self) -> &[(u64, u64)] {
        &self.nodes
    }

    pub fn set_nodes(&mut self, chromosome_index: usize, pair: (u64, u64)) {
        if self.nodes.len() <= chromosome_index {
            self.nodes.resize(chromosome_index + 1, (0, 0));
        }
        self.nodes[chromosome_index] = pair;
    }

    /// All currently-alive tree-sequence node ids carried by this
    /// individual, used as the simplification sample set (spec §4.9).
    pub fn alive_node_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.iter().flat_map(|&(a, b)| [a, b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gensim_core::prelude::Haplosome as CoreHaplosome;

    #[test]
    fn haplosome_slot_indexes_by_chromosome_and_copy() {
        let ind = Individual::new(
            0,
            0,
            Sex::Hermaphrodite,
            -1,
            -1,
            vec![CoreHaplosome::new_null(0), CoreHaplosome::new_null(0), CoreHaplosome::new_null(1), CoreHaplosome::new_null(1)],
        );
        assert!(ind.haplosome(1, 0).is_ok());
        assert!(ind.haplosome(2, 0).is_err());
    }
}

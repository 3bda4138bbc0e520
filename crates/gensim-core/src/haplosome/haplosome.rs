use gensim_error::{GensimError, GensimResult};
use smallvec::SmallVec;

use crate::run::MutationRun;

/// Inline capacity for a haplosome's mutrun vector (spec §11 "embedded
/// buffer, `SLIM_HAPLOSOME_MUTRUN_BUFSIZE = 1`, heap overflow beyond that").
/// Most chromosomes run with a single mutrun per haplosome in small models;
/// reserving one inline slot avoids a heap allocation for the overwhelmingly
/// common case while [`SmallVec`] transparently spills to the heap once a
/// chromosome's self-tuning optimizer decides to split into more runs.
const MUTRUN_BUFSIZE: usize = 1;

/// The three states a [`Haplosome`] can be in (spec §3 "Haplosome").
enum HaplosomeContent {
    /// This copy of the chromosome does not exist in this individual (e.g.
    /// the Y in an XX individual, or an unmodeled chromosome). Any access to
    /// its mutations is a programming error.
    Null,
    /// This haplosome exists but its mutation runs have not been
    /// materialized yet — used for individuals read from a tree sequence or
    /// snapshot whose sequence is realized lazily on first access.
    Deferred,
    /// Live, with one [`MutationRun`] per mutrun interval of the owning
    /// chromosome.
    Populated(SmallVec<[MutationRun; MUTRUN_BUFSIZE]>),
}

/// One copy of one chromosome carried by an individual (spec §3
/// "Haplosome"). A diploid individual has two `Haplosome`s per autosome; sex
/// chromosomes and unmodeled copies use the `Null` state instead of being
/// omitted, so that haplosome indices stay stable across individuals.
pub struct Haplosome {
    chromosome_index: u16,
    content: HaplosomeContent,
}

impl Haplosome {
    pub fn new_null(chromosome_index: u16) -> Self {
        Haplosome { chromosome_index, content: HaplosomeContent::Null }
    }

    pub fn new_deferred(chromosome_index: u16) -> Self {
        Haplosome { chromosome_index, content: HaplosomeContent::Deferred }
    }

    pub fn new_populated(chromosome_index: u16, runs: impl IntoIterator<Item = MutationRun>) -> Self {
        Haplosome {
            chromosome_index,
            content: HaplosomeContent::Populated(runs.into_iter().collect()),
        }
    }

    pub fn chromosome_index(&self) -> u16 {
        self.chromosome_index
    }

    pub fn is_null(&self) -> bool {
        matches!(self.content, HaplosomeContent::Null)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.content, HaplosomeContent::Deferred)
    }

    pub fn is_populated(&self) -> bool {
        matches!(self.content, HaplosomeContent::Populated(_))
    }

    /// Materializes a deferred haplosome with the given runs. Spec §3 edge
    /// case: "a deferred haplosome may only be realized once; realizing an
    /// already-populated or null haplosome is a Runtime error."
    pub fn realize_deferred(&mut self, runs: impl IntoIterator<Item = MutationRun>) -> GensimResult<()> {
        if !self.is_deferred() {
            return Err(GensimError::runtime(
                "realize_deferred called on a haplosome that is not in the deferred state",
            ));
        }
        self.content = HaplosomeContent::Populated(runs.into_iter().collect());
        Ok(())
    }

    pub fn mutruns(&self) -> GensimResult<&[MutationRun]> {
        match &self.content {
            HaplosomeContent::Populated(runs) => Ok(runs.as_slice()),
            HaplosomeContent::Null => Err(GensimError::invariant(
                "attempted to read mutation runs of a null haplosome",
            )),
            HaplosomeContent::Deferred => Err(GensimError::invariant(
                "attempted to read mutation runs of a deferred haplosome before realizing it",
            )),
        }
    }

    pub fn mutruns_mut(&mut self) -> GensimResult<&mut [MutationRun]> {
        match &mut self.content {
            HaplosomeContent::Populated(runs) => Ok(runs.as_mut_slice()),
            HaplosomeContent::Null => Err(GensimError::invariant(
                "attempted to write mutation runs of a null haplosome",
            )),
            HaplosomeContent::Deferred => Err(GensimError::invariant(
                "attempted to write mutation runs of a deferred haplosome before realizing it",
            )),
        }
    }

    pub fn mutrun_count(&self) -> usize {
        match &self.content {
            HaplosomeContent::Populated(runs) => runs.len(),
            _ => 0,
        }
    }

    pub fn mutation_count(&self) -> GensimResult<usize> {
        Ok(self.mutruns()?.iter().map(|run| run.len()).sum())
    }

    /// Replaces this haplosome's mutrun vector outright, used when
    /// crossover-mutation assembles a child haplosome from scratch.
    pub fn set_mutruns(&mut self, runs: impl IntoIterator<Item = MutationRun>) {
        self.content = HaplosomeContent::Populated(runs.into_iter().collect());
    }

    /// Resets this shell to the null state for reuse by
    /// [`super::pool::HaplosomePool`], dropping any mutrun references it
    /// held.
    pub fn reset_to_null(&mut self, chromosome_index: u16) {
        self.chromosome_index = chromosome_index;
        self.content = HaplosomeContent::Null;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_haplosome_rejects_mutrun_access() {
        let h = Haplosome::new_null(0);
        assert!(h.is_null());
        assert!(h.mutruns().is_err());
    }

    #[test]
    fn deferred_haplosome_realizes_exactly_once() {
        let mut h = Haplosome::new_deferred(0);
        assert!(h.is_deferred());
        h.realize_deferred(vec![MutationRun::empty()]).unwrap();
        assert!(h.is_populated());
        assert!(h.realize_deferred(vec![MutationRun::empty()]).is_err());
    }

    #[test]
    fn populated_haplosome_reports_mutation_count() {
        let run = MutationRun::from_sorted(vec![1, 2, 3]);
        let h = Haplosome::new_populated(0, vec![run]);
        assert_eq!(h.mutation_count().unwrap(), 3);
    }
}

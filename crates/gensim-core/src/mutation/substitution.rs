use super::types::{Mutation, Nucleotide};

/// A permanent record of a mutation that has gone to fixation (spec §4.1,
/// §11 "Substitution retention"). Once every haplosome in the population
/// carries a mutation, tracking it as a live, refcounted
/// [`Mutation`](super::types::Mutation) is wasted work: it will never again
/// be absent anywhere, so derived-state computations (fitness, output) can
/// treat its contribution as a population-wide constant instead of walking
/// mutation runs to find it. `Substitution` is that constant.
///
/// It is indexed by `(chromosome_index, position)` rather than by
/// [`super::types::MutationIndex`], because the original mutation's block
/// slot is recycled once substituted — the certificate outlives the slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Substitution {
    pub id: u64,
    pub muttype_id: u32,
    pub chromosome_index: u16,
    pub position: i64,
    pub origin_tick: u32,
    pub fixation_tick: u32,
    pub nucleotide: Nucleotide,
}

impl Substitution {
    pub fn from_fixed_mutation(mutation: &Mutation, fixation_tick: u32) -> Self {
        Substitution {
            id: mutation.id,
            muttype_id: mutation.muttype_id,
            chromosome_index: mutation.chromosome_index,
            position: mutation.position,
            origin_tick: mutation.origin_tick,
            fixation_tick,
            nucleotide: mutation.nucleotide,
        }
    }
}

/// Species-wide list of substitutions, grouped implicitly by
/// `chromosome_index` via the lookup key. Retained for the lifetime of the
/// simulation (spec §4.1): substitutions are never forgotten, only
/// appended to, since every later tick's fixed state is a superset of
/// every earlier one's.
#[derive(Debug, Default)]
pub struct SubstitutionList {
    entries: Vec<Substitution>,
}

impl SubstitutionList {
    pub fn new() -> Self {
        SubstitutionList { entries: Vec::new() }
    }

    pub fn push(&mut self, substitution: Substitution) {
        self.entries.push(substitution);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Substitution> {
        self.entries.iter()
    }

    /// All substitutions on a given chromosome, in the order they fixed.
    /// Used by the derived-state walk (spec §4.4's stacked-state comparison)
    /// to fold in fixed mutations alongside segregating ones.
    pub fn on_chromosome(&self, chromosome_index: u16) -> impl Iterator<Item = &Substitution> {
        self.entries
            .iter()
            .filter(move |s| s.chromosome_index == chromosome_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::types::MutationState;

    #[test]
    fn substitution_carries_forward_identity_fields() {
        let mutation = Mutation {
            id: 7,
            muttype_id: 1,
            chromosome_index: 0,
            position: 100,
            origin_tick: 5,
            origin_subpop_id: 0,
            nucleotide: Nucleotide::None,
            state: MutationState::InRegistry,
        };
        let sub = Substitution::from_fixed_mutation(&mutation, 42);
        assert_eq!(sub.id, 7);
        assert_eq!(sub.position, 100);
        assert_eq!(sub.fixation_tick, 42);
    }

    #[test]
    fn on_chromosome_filters_correctly() {
        let mut list = SubstitutionList::new();
        list.push(Substitution {
            id: 1,
            muttype_id: 0,
            chromosome_index: 0,
            position: 10,
            origin_tick: 0,
            fixation_tick: 1,
            nucleotide: Nucleotide::None,
        });
        list.push(Substitution {
            id: 2,
            muttype_id: 0,
            chromosome_index: 1,
            position: 20,
            origin_tick: 0,
            fixation_tick: 2,
            nucleotide: Nucleotide::None,
        });

        let on_zero: Vec<_> = list.on_chromosome(0).collect();
        assert_eq!(on_zero.len(), 1);
        assert_eq!(on_zero[0].position, 10);
    }
}

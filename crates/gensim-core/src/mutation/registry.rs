use gensim_error::{GensimError, GensimResult};
use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::block::MutationBlock;
use super::substitution::{Substitution, SubstitutionList};
use super::trait_table::TraitTable;
use super::types::{Mutation, MutationIndex, MutationState};

/// Species-wide store of segregating mutations: the arena itself, a
/// refcount per mutation, a position index for stacking-policy lookups, and
/// the growing list of mutations that have gone to fixation (spec §4.1,
/// §4.8, §9 "refcount tallying").
///
/// Refcounts are the authoritative signal for both ends of a mutation's
/// life: a count of zero means no haplosome references it anymore and it can
/// be swept back into the block's free list; a count equal to twice the
/// population's total haplosome count (for a diploid population) means it
/// has reached fixation and should be retired into [`SubstitutionList`].
pub struct MutationRegistry {
    block: MutationBlock,
    traits: TraitTable,
    refcounts: HashMap<MutationIndex, u32>,
    position_index: HashMap<(u16, i64), SmallVec<[MutationIndex; 4]>>,
    substitutions: SubstitutionList,
}

impl MutationRegistry {
    pub fn new(num_traits: usize) -> Self {
        MutationRegistry {
            block: MutationBlock::new(),
            traits: TraitTable::new(num_traits),
            refcounts: HashMap::new(),
            position_index: HashMap::new(),
            substitutions: SubstitutionList::new(),
        }
    }

    pub fn block(&self) -> &MutationBlock {
        &self.block
    }

    pub fn traits(&self) -> &TraitTable {
        &self.traits
    }

    pub fn traits_mut(&mut self) -> &mut TraitTable {
        &mut self.traits
    }

    pub fn substitutions(&self) -> &SubstitutionList {
        &self.substitutions
    }

    /// Registers a freshly drawn mutation with an initial refcount of
    /// `use_count` (normally 1, the single haplosome crossover-mutation just
    /// placed it in). Returns the index it was assigned.
    pub fn register(&mut self, mut mutation: Mutation, use_count: u32) -> GensimResult<MutationIndex> {
        mutation.state = MutationState::InRegistry;
        let key = (mutation.chromosome_index, mutation.position);
        let index = self.block.insert(mutation)?;
        self.traits.grow_to(self.block.capacity());
        self.refcounts.insert(index, use_count);
        self.position_index.entry(key).or_default().push(index);
        trace!(mutation_index = index, "registered new mutation");
        Ok(index)
    }

    pub fn refcount(&self, index: MutationIndex) -> u32 {
        self.refcounts.get(&index).copied().unwrap_or(0)
    }

    /// Bulk-clears every refcount to zero without dropping the entries
    /// (spec §4.1 `zero_refcounts()`), the first half of the
    /// recompute-from-scratch tally spec §11 describes: a caller walks every
    /// haplosome's runs afterward and calls [`MutationRegistry::bump_reference`]
    /// once per occurrence.
    pub fn zero_refcounts(&mut self) {
        for count in self.refcounts.values_mut() {
            *count = 0;
        }
    }

    /// Increments `index`'s refcount by one, the per-occurrence step of the
    /// tally described at [`MutationRegistry::zero_refcounts`]. Unlike
    /// [`MutationRegistry::add_reference`] this never fails on a missing
    /// entry; a mutation's refcount always exists once registered, so the
    /// lookup is infallible by construction during a tally pass.
    pub fn bump_reference(&mut self, index: MutationIndex) -> u32 {
        let count = self.refcounts.entry(index).or_insert(0);
        *count += 1;
        *count
    }

    pub fn add_reference(&mut self, index: MutationIndex, delta: i64) -> GensimResult<u32> {
        let count = self
            .refcounts
            .get_mut(&index)
            .ok_or_else(|| GensimError::invariant(format!("no refcount entry for mutation {index}")))?;
        let updated = *count as i64 + delta;
        if updated < 0 {
            return Err(GensimError::invariant(format!(
                "refcount for mutation {index} went negative"
            )));
        }
        *count = updated as u32;
        Ok(*count)
    }

    /// All mutations from the group `mutations belong to at the same
    /// `(chromosome_index, position)`, used to enforce [`super::types::StackPolicy`]
    /// before inserting a newly drawn mutation (spec §4.8).
    pub fn at_position(&self, chromosome_index: u16, position: i64) -> &[MutationIndex] {
        self.position_index
            .get(&(chromosome_index, position))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, index: MutationIndex) -> GensimResult<&Mutation> {
        self.block.get(index)
    }

    /// Sweeps the registry after a refcount-tallying pass, the analogue of
    /// the original's `ZeroRefcountBlock`/fixation check (spec §4.1, §9).
    /// `total_haplosome_count` is the number of haplosome copies among which
    /// a refcount of that magnitude means universal fixation (e.g. `2 * N`
    /// for a diploid autosome).
    pub fn sweep(&mut self, total_haplosome_count: u32, tick: u32) -> GensimResult<SweepReport> {
        let mut removed = 0u32;
        let mut fixed = 0u32;
        let indices: Vec<MutationIndex> = self.refcounts.keys().copied().collect();

        for index in indices {
            let count = self.refcounts[&index];
            if count == 0 {
                self.remove_from_position_index(index)?;
                self.refcounts.remove(&index);
                self.block.dispose(index)?;
                removed += 1;
            } else if total_haplosome_count > 0 && count >= total_haplosome_count {
                let mutation = *self.block.get(index)?;
                self.substitutions
                    .push(Substitution::from_fixed_mutation(&mutation, tick));
                self.remove_from_position_index(index)?;
                self.refcounts.remove(&index);
                self.block.dispose(index)?;
                fixed += 1;
            }
        }

        if removed > 0 || fixed > 0 {
            debug!(removed, fixed, tick, "mutation registry sweep");
        }

        Ok(SweepReport { removed, fixed })
    }

    fn remove_from_position_index(&mut self, index: MutationIndex) -> GensimResult<()> {
        let mutation = *self.block.get(index)?;
        let key = (mutation.chromosome_index, mutation.position);
        if let Some(list) = self.position_index.get_mut(&key) {
            list.retain(|i| *i != index);
            if list.is_empty() {
                self.position_index.remove(&key);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub removed: u32,
    pub fixed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::types::Nucleotide;

    fn mutation_at(position: i64) -> Mutation {
        Mutation::new(0, 0, position, 0, 0, Nucleotide::None)
    }

    #[test]
    fn register_then_lookup_by_position() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(mutation_at(10), 1).unwrap();
        assert_eq!(registry.at_position(0, 10), &[index]);
    }

    #[test]
    fn sweep_removes_zero_refcount_mutations() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(mutation_at(5), 1).unwrap();
        registry.add_reference(index, -1).unwrap();
        assert_eq!(registry.refcount(index), 0);

        let report = registry.sweep(10, 3).unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(report.fixed, 0);
        assert!(registry.get(index).is_err());
    }

    #[test]
    fn sweep_retires_fixed_mutations_into_substitutions() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(mutation_at(7), 1).unwrap();
        registry.add_reference(index, 9).unwrap();
        assert_eq!(registry.refcount(index), 10);

        let report = registry.sweep(10, 4).unwrap();
        assert_eq!(report.fixed, 1);
        assert_eq!(registry.substitutions().len(), 1);
        assert!(registry.get(index).is_err());
    }

    #[test]
    fn zero_then_bump_recomputes_refcount_from_scratch() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(mutation_at(3), 1).unwrap();
        registry.add_reference(index, 4).unwrap();
        assert_eq!(registry.refcount(index), 5);

        registry.zero_refcounts();
        assert_eq!(registry.refcount(index), 0);
        registry.bump_reference(index);
        registry.bump_reference(index);
        assert_eq!(registry.refcount(index), 2);
    }

    #[test]
    fn negative_refcount_is_rejected() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(mutation_at(1), 1).unwrap();
        assert!(registry.add_reference(index, -5).is_err());
    }
}

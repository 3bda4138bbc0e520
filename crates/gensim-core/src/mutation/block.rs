use gensim_error::{GensimError, GensimResult};

use super::types::{Mutation, MutationIndex, MUTATION_BLOCK_HARD_CEILING, MUTATION_INDEX_NONE};

/// One slot in a [`MutationBlock`]'s backing store. A disposed slot's free
/// list normally reinterprets the first word of a dead value as the index
/// of the next free slot — a pointer-punning trick that only works when
/// raw storage carries no type. Rust does have a type for "either a live
/// value or a free-list link," so we use it instead of `MaybeUninit` games.
#[derive(Clone, Copy, Debug)]
enum MutSlot {
    Live(Mutation),
    Free(MutationIndex),
}

/// Arena allocator for [`Mutation`] records (spec §4.1 "MutationBlock").
///
/// Mutations are referenced by [`MutationIndex`] rather than by pointer or
/// reference, so the block can reallocate its backing `Vec` to grow without
/// invalidating anything a caller is holding. Disposed slots are threaded
/// onto a singly linked free list through the slot itself, so no separate
/// free-list storage is needed.
#[derive(Debug, Default)]
pub struct MutationBlock {
    slots: Vec<MutSlot>,
    free_head: MutationIndex,
    live_count: u64,
}

impl MutationBlock {
    pub fn new() -> Self {
        MutationBlock {
            slots: Vec::new(),
            free_head: MUTATION_INDEX_NONE,
            live_count: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MutationBlock {
            slots: Vec::with_capacity(capacity),
            free_head: MUTATION_INDEX_NONE,
            live_count: 0,
        }
    }

    pub fn live_count(&self) -> u64 {
        self.live_count
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Places `mutation` into a free slot (or grows the block by one slot if
    /// none is free) and returns its index. Spec §4.1 edge case: "the block
    /// enforces a hard ceiling... exceeding it is a Runtime error rather than
    /// an unbounded allocation."
    pub fn insert(&mut self, mutation: Mutation) -> GensimResult<MutationIndex> {
        if self.live_count >= MUTATION_BLOCK_HARD_CEILING {
            return Err(GensimError::runtime(format!(
                "mutation block hard ceiling of {MUTATION_BLOCK_HARD_CEILING} live mutations exceeded"
            )));
        }

        let index = if self.free_head != MUTATION_INDEX_NONE {
            let index = self.free_head;
            self.free_head = match self.slots[index as usize] {
                MutSlot::Free(next) => next,
                MutSlot::Live(_) => {
                    return Err(GensimError::invariant(
                        "free list pointed at a live slot",
                    ));
                }
            };
            self.slots[index as usize] = MutSlot::Live(mutation);
            index
        } else {
            let index = self.slots.len() as MutationIndex;
            self.slots.push(MutSlot::Live(mutation));
            index
        };

        self.live_count += 1;
        Ok(index)
    }

    /// Returns the mutation at `index`, or an invariant error if the slot is
    /// free (a use-after-dispose, which should never happen if callers track
    /// refcounts correctly).
    pub fn get(&self, index: MutationIndex) -> GensimResult<&Mutation> {
        match self.slots.get(index as usize) {
            Some(MutSlot::Live(mutation)) => Ok(mutation),
            Some(MutSlot::Free(_)) => Err(GensimError::invariant(format!(
                "mutation index {index} refers to a disposed slot"
            ))),
            None => Err(GensimError::invariant(format!(
                "mutation index {index} out of range"
            ))),
        }
    }

    pub fn get_mut(&mut self, index: MutationIndex) -> GensimResult<&mut Mutation> {
        match self.slots.get_mut(index as usize) {
            Some(MutSlot::Live(mutation)) => Ok(mutation),
            Some(MutSlot::Free(_)) => Err(GensimError::invariant(format!(
                "mutation index {index} refers to a disposed slot"
            ))),
            None => Err(GensimError::invariant(format!(
                "mutation index {index} out of range"
            ))),
        }
    }

    /// Recycles the slot at `index` onto the free list. The registry's
    /// zero-refcount sweep is the caller of this method, invoked once a
    /// mutation's refcount (tracked in [`super::registry::MutationRegistry`])
    /// reaches zero.
    pub fn dispose(&mut self, index: MutationIndex) -> GensimResult<()> {
        match self.slots.get(index as usize) {
            Some(MutSlot::Live(_)) => {}
            Some(MutSlot::Free(_)) => {
                return Err(GensimError::invariant(format!(
                    "double dispose of mutation index {index}"
                )));
            }
            None => {
                return Err(GensimError::invariant(format!(
                    "mutation index {index} out of range"
                )));
            }
        }

        self.slots[index as usize] = MutSlot::Free(self.free_head);
        self.free_head = index;
        self.live_count -= 1;
        Ok(())
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (MutationIndex, &Mutation)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            MutSlot::Live(m) => Some((i as MutationIndex, m)),
            MutSlot::Free(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::types::Nucleotide;

    fn sample_mutation(position: i64) -> Mutation {
        Mutation::new(0, 0, position, 0, 0, Nucleotide::None)
    }

    #[test]
    fn insert_and_get_round_trip() {
        let mut block = MutationBlock::new();
        let idx = block.insert(sample_mutation(42)).unwrap();
        assert_eq!(block.get(idx).unwrap().position, 42);
        assert_eq!(block.live_count(), 1);
    }

    #[test]
    fn disposed_slot_is_recycled_by_next_insert() {
        let mut block = MutationBlock::new();
        let a = block.insert(sample_mutation(1)).unwrap();
        block.insert(sample_mutation(2)).unwrap();
        block.dispose(a).unwrap();
        assert_eq!(block.live_count(), 1);

        let c = block.insert(sample_mutation(3)).unwrap();
        assert_eq!(c, a, "disposed slot should be reused before growing");
        assert_eq!(block.capacity(), 2);
    }

    #[test]
    fn double_dispose_is_an_invariant_error() {
        let mut block = MutationBlock::new();
        let a = block.insert(sample_mutation(1)).unwrap();
        block.dispose(a).unwrap();
        assert!(block.dispose(a).is_err());
    }

    #[test]
    fn access_after_dispose_is_an_invariant_error() {
        let mut block = MutationBlock::new();
        let a = block.insert(sample_mutation(1)).unwrap();
        block.dispose(a).unwrap();
        assert!(block.get(a).is_err());
    }

    #[test]
    fn iter_live_skips_free_slots() {
        let mut block = MutationBlock::new();
        let a = block.insert(sample_mutation(1)).unwrap();
        block.insert(sample_mutation(2)).unwrap();
        block.dispose(a).unwrap();

        let positions: Vec<i64> = block.iter_live().map(|(_, m)| m.position).collect();
        assert_eq!(positions, vec![2]);
    }
}

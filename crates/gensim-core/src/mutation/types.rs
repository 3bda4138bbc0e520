use std::sync::atomic::{AtomicU64, Ordering};

/// A 32-bit index into the per-species [`super::block::MutationBlock`]
/// (spec §3 "Mutation", §9 "Arena + index references"). Not a pointer: the
/// block can grow without invalidating this reference, unlike the raw
/// addresses SLiM hands to user script.
pub type MutationIndex = u32;

/// Sentinel free-list terminator, the Rust analogue of SLiM's `-1`
/// (`MutationIndex` there is signed; ours is unsigned, so the all-ones
/// pattern plays the same role).
pub const MUTATION_INDEX_NONE: MutationIndex = u32::MAX;

/// Hard ceiling on live mutations in a single block (spec §4.1).
pub const MUTATION_BLOCK_HARD_CEILING: u64 = 1 << 31;

/// Globally unique, monotonically increasing mutation id. Spec §5: "Mutation
/// ids are monotonically increasing but not strictly in order of creation
/// across threads; within one thread they are increasing." A single atomic
/// counter gives exactly that: strictly increasing overall, hence increasing
/// along any one thread's subsequence, but interleavings across threads are
/// not ordered by wall-clock creation time.
static NEXT_MUTATION_ID: AtomicU64 = AtomicU64::new(0);

pub fn next_mutation_id() -> u64 {
    NEXT_MUTATION_ID.fetch_add(1, Ordering::Relaxed)
}

/// One of the four nucleotide bases, or "no nucleotide" for non-nucleotide
/// models (spec §3: "optional nucleotide in {0,1,2,3,-1}").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    None,
}

impl Nucleotide {
    pub fn as_signed_byte(self) -> i8 {
        match self {
            Nucleotide::A => 0,
            Nucleotide::C => 1,
            Nucleotide::G => 2,
            Nucleotide::T => 3,
            Nucleotide::None => -1,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Nucleotide::A,
            1 => Nucleotide::C,
            2 => Nucleotide::G,
            _ => Nucleotide::T,
        }
    }
}

/// Lifecycle state of a [`Mutation`] (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationState {
    /// Just drawn by crossover-mutation, not yet placed in the registry.
    New,
    /// Present in the species' mutation registry; segregating.
    InRegistry,
    /// Refcount reached the fixation threshold; retired into the
    /// substitution list but a [`crate::mutation::substitution::Substitution`]
    /// stands in for it in derived-state computations.
    FixedAndSubstituted,
    /// Removed from circulation after substitution bookkeeping completed.
    RemovedWithSubstitution,
}

/// How multiple mutations from the same stack group interact when inserted
/// at the same position (spec §4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackPolicy {
    /// Always insert; any number of mutations from the group may coexist.
    Stack,
    /// Insert only if no mutation from the group already exists there.
    KeepFirst,
    /// Remove all existing mutations from the group at that position, then
    /// insert.
    KeepLast,
}

/// Stack group identity. Nucleotide-based mutation types share group `-1`
/// unconditionally with `keep-last` policy (spec §4.2, §4.8); we model that
/// reserved group as a dedicated variant so it can't collide with a
/// user-assigned integer group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackGroup {
    Nucleotide,
    Group(i32),
}

/// How per-mutation trait contributions combine across mutations in a
/// haplosome (original source `trait.cpp`: additive or multiplicative).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraitCombination {
    Additive,
    Multiplicative,
}

/// Per-trait effect size and dominance coefficient, stored in the
/// MutationBlock's per-trait-info buffer (spec §3, §4.1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraitInfo {
    pub effect: f32,
    pub dominance: f32,
}

impl Default for TraitInfo {
    fn default() -> Self {
        TraitInfo { effect: 0.0, dominance: 0.5 }
    }
}

/// A mutation type: its stack group/policy and the number of traits it
/// carries effect/dominance values for. The mutation type id indexes into
/// the species' mutation-type table.
#[derive(Clone, Debug)]
pub struct MutationType {
    pub id: u32,
    pub stack_group: StackGroup,
    pub stack_policy: StackPolicy,
    pub nucleotide_based: bool,
}

impl MutationType {
    pub fn new(id: u32, stack_group: i32, stack_policy: StackPolicy) -> Self {
        MutationType {
            id,
            stack_group: StackGroup::Group(stack_group),
            stack_policy,
            nucleotide_based: false,
        }
    }

    pub fn nucleotide(id: u32) -> Self {
        MutationType {
            id,
            stack_group: StackGroup::Nucleotide,
            stack_policy: StackPolicy::KeepLast,
            nucleotide_based: true,
        }
    }

    pub fn effective_stack_group(&self) -> StackGroup {
        if self.nucleotide_based {
            StackGroup::Nucleotide
        } else {
            self.stack_group
        }
    }

    pub fn effective_stack_policy(&self) -> StackPolicy {
        if self.nucleotide_based {
            StackPolicy::KeepLast
        } else {
            self.stack_policy
        }
    }
}

/// A single mutation record (spec §3). Fixed-size and `Copy` so it can live
/// directly in the [`super::block::MutationBlock`]'s parallel buffer.
///
/// Invariant: once `position` is assigned at construction it never changes
/// for the lifetime of this record (it may be recycled into a different
/// mutation after disposal, at which point it is a different logical
/// mutation with a fresh id).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mutation {
    pub id: u64,
    pub muttype_id: u32,
    pub chromosome_index: u16,
    pub position: i64,
    pub origin_tick: u32,
    pub origin_subpop_id: u32,
    pub nucleotide: Nucleotide,
    pub state: MutationState,
}

impl Mutation {
    pub fn new(
        muttype_id: u32,
        chromosome_index: u16,
        position: i64,
        origin_tick: u32,
        origin_subpop_id: u32,
        nucleotide: Nucleotide,
    ) -> Self {
        Mutation {
            id: next_mutation_id(),
            muttype_id,
            chromosome_index,
            position,
            origin_tick,
            origin_subpop_id,
            nucleotide,
            state: MutationState::New,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_ids_strictly_increase_within_a_thread() {
        let a = Mutation::new(0, 0, 10, 0, 0, Nucleotide::None);
        let b = Mutation::new(0, 0, 20, 0, 0, Nucleotide::None);
        assert!(b.id > a.id);
    }

    #[test]
    fn nucleotide_muttype_forces_keep_last_on_reserved_group() {
        let mt = MutationType::nucleotide(3);
        assert_eq!(mt.effective_stack_group(), StackGroup::Nucleotide);
        assert_eq!(mt.effective_stack_policy(), StackPolicy::KeepLast);
    }
}

use std::sync::Arc;

use gensim_error::{GensimError, GensimResult};

use crate::mutation::{MutationIndex, StackGroup, StackPolicy};

/// The sorted-by-position payload of a [`MutationRun`]. Kept behind an `Arc`
/// so that many haplosomes can share one allocation when they happen to
/// carry the same sequence of mutations — the common case for a freshly
/// copied chromosome before any new mutation lands on it (spec §4.2 "Runs
/// are immutable once shared; a haplosome edits its own run only if it is
/// the run's sole owner").
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct RunData {
    mutations: Vec<MutationIndex>,
}

/// A shared, sorted sequence of mutation indices covering one mutrun
/// interval of one haplosome (spec §4.2 "MutationRun").
///
/// Identity, not content, is what callers usually care about: two
/// `MutationRun`s that happen to contain the same mutations in the same
/// order are still different runs unless they share the same `Arc`
/// allocation, because the bulk-operation coalescer and bookkeeping such as
/// "use count" key off pointer identity (spec §4.2, §4.7). [`MutationRun::ptr_eq`]
/// exposes that comparison directly; `PartialEq` on the type instead compares
/// contents, which is what sorting/deduplicating drawn breakpoints wants.
#[derive(Clone, Debug)]
pub struct MutationRun {
    data: Arc<RunData>,
}

impl MutationRun {
    pub fn empty() -> Self {
        MutationRun { data: Arc::new(RunData::default()) }
    }

    /// `mutations` must already be ordered by genomic position (spec §4.2:
    /// "sorted ascending by position"). `MutationIndex` values themselves
    /// carry no position ordering — they are arena slots, reused via the
    /// free list — so this constructor trusts the caller's ordering rather
    /// than asserting on the index values, which a position-sorted run has
    /// no reason to also satisfy.
    pub fn from_sorted(mutations: Vec<MutationIndex>) -> Self {
        MutationRun { data: Arc::new(RunData { mutations }) }
    }

    pub fn len(&self) -> usize {
        self.data.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.mutations.is_empty()
    }

    pub fn as_slice(&self) -> &[MutationIndex] {
        &self.data.mutations
    }

    /// How many haplosomes currently point at this run's allocation,
    /// including this handle — the run's "use count": `Arc::strong_count`
    /// is exactly that number, since every live `MutationRun` handle is one
    /// strong reference.
    pub fn use_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }

    pub fn ptr_eq(&self, other: &MutationRun) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// A stable key for this run's backing allocation, used by
    /// [`super::bulk::BulkRunCache`] to key its coalescer map on input-run
    /// identity rather than content.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }

    /// Returns a mutable view of this run's mutation list if this handle is
    /// the sole owner, otherwise `None`. A haplosome about to mutate its run
    /// first asks whether the run is shared; if so, it must clone before
    /// editing. `Arc::get_mut` is exactly that check, and cloning on the
    /// `None` branch is the copy-before-edit this implements — see
    /// [`MutationRun::make_mut`] for the convenience wrapper that performs
    /// the clone automatically.
    fn try_get_mut(&mut self) -> Option<&mut Vec<MutationIndex>> {
        Arc::get_mut(&mut self.data).map(|data| &mut data.mutations)
    }

    /// Returns a mutable view of this run's mutation list, cloning the
    /// underlying data first if another haplosome shares this run. After
    /// this call, this handle is guaranteed to be the sole owner of its
    /// (possibly new) allocation.
    pub fn make_mut(&mut self) -> &mut Vec<MutationIndex> {
        if Arc::get_mut(&mut self.data).is_none() {
            self.data = Arc::new((*self.data).clone());
        }
        &mut Arc::get_mut(&mut self.data).expect("just took sole ownership").mutations
    }

    /// Inserts `index` into this run at the position order requires,
    /// honoring `policy` against any existing mutations from `group` at the
    /// same `position` (spec §4.8 "Mutation stacking policy").
    ///
    /// `existing_group_members` is the slice of mutation indices already in
    /// this run that belong to `group` at `position`, typically obtained
    /// from [`crate::mutation::MutationRegistry::at_position`] filtered to
    /// this run's own contents by the caller, since the run itself does not
    /// know mutation types.
    pub fn insert_with_stacking(
        &mut self,
        index: MutationIndex,
        position_rank: usize,
        group: StackGroup,
        policy: StackPolicy,
        existing_group_members: &[MutationIndex],
    ) -> GensimResult<bool> {
        let _ = group;
        match policy {
            StackPolicy::Stack => {
                self.insert_at_rank(index, position_rank);
                Ok(true)
            }
            StackPolicy::KeepFirst => {
                if existing_group_members.is_empty() {
                    self.insert_at_rank(index, position_rank);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            StackPolicy::KeepLast => {
                for member in existing_group_members {
                    self.remove(*member)?;
                }
                self.insert_at_rank(index, position_rank);
                Ok(true)
            }
        }
    }

    fn insert_at_rank(&mut self, index: MutationIndex, position_rank: usize) {
        let mutations = self.make_mut();
        let at = position_rank.min(mutations.len());
        mutations.insert(at, index);
    }

    fn remove(&mut self, index: MutationIndex) -> GensimResult<()> {
        let mutations = self.make_mut();
        let pos = mutations
            .iter()
            .position(|m| *m == index)
            .ok_or_else(|| GensimError::invariant(format!("mutation {index} not present in run")))?;
        mutations.remove(pos);
        Ok(())
    }

    pub fn contains(&self, index: MutationIndex) -> bool {
        self.data.mutations.contains(&index)
    }
}

impl PartialEq for MutationRun {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.data.mutations == other.data.mutations
    }
}

impl Eq for MutationRun {}

impl Default for MutationRun {
    fn default() -> Self {
        MutationRun::empty()
    }
}

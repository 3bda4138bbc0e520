use gensim_error::{GensimError, GensimResult};

use super::haplosome::Haplosome;
use crate::mutation::MutationIndex;

/// A forward-only cursor over a haplosome's mutation runs, addressed by
/// genomic position rather than by mutrun/offset pair (spec §3
/// "HaplosomeWalker").
///
/// Walking is monotonic by design: `move_to_position` only ever advances,
/// matching the access pattern of crossover-mutation and tree-sequence
/// recording, both of which process positions in increasing order. Asking
/// for an earlier position than the cursor's current one is a programming
/// error, not a seek.
pub struct HaplosomeWalker<'h> {
    mutrun_length: i64,
    runs: &'h [crate::run::MutationRun],
    current_mutrun: usize,
}

impl<'h> HaplosomeWalker<'h> {
    pub fn new(haplosome: &'h Haplosome, mutrun_length: i64) -> GensimResult<Self> {
        if mutrun_length <= 0 {
            return Err(GensimError::invariant("mutrun_length must be positive"));
        }
        Ok(HaplosomeWalker {
            mutrun_length,
            runs: haplosome.mutruns()?,
            current_mutrun: 0,
        })
    }

    pub fn mutrun_index_for(&self, position: i64) -> usize {
        (position / self.mutrun_length) as usize
    }

    /// Advances the cursor so that subsequent queries are scoped to the
    /// mutrun containing `position`. No-op if already there.
    pub fn move_to_position(&mut self, position: i64) -> GensimResult<()> {
        let target = self.mutrun_index_for(position);
        if target < self.current_mutrun {
            return Err(GensimError::invariant(
                "HaplosomeWalker only moves forward; requested position is behind the cursor",
            ));
        }
        self.current_mutrun = target;
        Ok(())
    }

    pub fn current_mutrun_index(&self) -> usize {
        self.current_mutrun
    }

    /// The mutations in the run the cursor currently sits on.
    pub fn current_run_mutations(&self) -> GensimResult<&'h [MutationIndex]> {
        self.runs
            .get(self.current_mutrun)
            .map(|run| run.as_slice())
            .ok_or_else(|| GensimError::invariant("cursor advanced past the end of this haplosome's mutruns"))
    }

    /// Fast-path comparison used by the derived-state walk (spec §4.4): if
    /// both walkers' current runs are the same shared allocation, their
    /// mutation content at the current position is identical without
    /// needing to compare contents element by element.
    pub fn identical_at_current_position_to(&self, other: &HaplosomeWalker<'_>) -> GensimResult<bool> {
        if self.current_mutrun != other.current_mutrun {
            return Err(GensimError::invariant(
                "cannot compare walkers positioned at different mutruns",
            ));
        }

        let a = self
            .runs
            .get(self.current_mutrun)
            .ok_or_else(|| GensimError::invariant("cursor out of range"))?;
        let b = other
            .runs
            .get(other.current_mutrun)
            .ok_or_else(|| GensimError::invariant("cursor out of range"))?;

        Ok(a.ptr_eq(b) || a.as_slice() == b.as_slice())
    }

    pub fn total_mutruns(&self) -> usize {
        self.runs.len()
    }

    pub fn at_end(&self) -> bool {
        self.current_mutrun >= self.runs.len()
    }
}

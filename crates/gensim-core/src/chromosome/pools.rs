use crate::haplosome::HaplosomePool;
use crate::run::RunBufferPool;

/// Per-chromosome object pools (spec §3 "Chromosome": "per-thread mutation-run
/// pools" and "two haplosome junkyards (one for null, one for non-null)").
///
/// One `RunBufferPool` is kept per thread partition so that mutrun buffer
/// reuse never crosses threads (spec §5: "a haplosome's mutrun slot `i` is
/// always allocated and freed through the context associated with `i`'s
/// thread partition, so no locking is required"). The two haplosome
/// junkyards are process-wide for this chromosome since recycling a
/// `Haplosome` shell only requires resetting its content tag, which is cheap
/// enough not to need per-thread partitioning.
pub struct ChromosomePools {
    run_pools: Vec<RunBufferPool>,
    null_junkyard: HaplosomePool,
    nonnull_junkyard: HaplosomePool,
}

impl ChromosomePools {
    pub fn new(thread_count: usize) -> Self {
        ChromosomePools {
            run_pools: (0..thread_count.max(1)).map(|_| RunBufferPool::new()).collect(),
            null_junkyard: HaplosomePool::new(),
            nonnull_junkyard: HaplosomePool::new(),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.run_pools.len()
    }

    /// The run-buffer pool for a given mutrun slot's thread partition, per
    /// spec §9 "Implementations should partition children deterministically
    /// by child index modulo thread count so that mutrun allocations for a
    /// given chromosome slot always come from the same thread's pool."
    pub fn run_pool_for_slot(&mut self, mutrun_index: usize) -> &mut RunBufferPool {
        let thread = mutrun_index % self.run_pools.len().max(1);
        &mut self.run_pools[thread]
    }

    pub fn null_junkyard(&mut self) -> &mut HaplosomePool {
        &mut self.null_junkyard
    }

    pub fn nonnull_junkyard(&mut self) -> &mut HaplosomePool {
        &mut self.nonnull_junkyard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_pool_for_slot_wraps_by_thread_count() {
        let mut pools = ChromosomePools::new(4);
        let _ = pools.run_pool_for_slot(0);
        let _ = pools.run_pool_for_slot(4);
        assert_eq!(pools.thread_count(), 4);
    }
}

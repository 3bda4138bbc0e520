use super::mutation_run::MutationRun;

/// Recycles the backing `Vec<MutationIndex>` buffers freed when a
/// [`MutationRun`] is dropped (or replaced by copy-on-write in
/// [`MutationRun::make_mut`](super::mutation_run::MutationRun::make_mut)),
/// so that crossover-mutation's per-offspring run construction amortizes
/// allocation rather than letting the allocator churn.
///
/// One `RunBufferPool` is meant to live for the duration of a single
/// fork-join worker's batch of offspring, not shared across threads.
#[derive(Default)]
pub struct RunBufferPool {
    free_buffers: Vec<Vec<u32>>,
}

impl RunBufferPool {
    pub fn new() -> Self {
        RunBufferPool { free_buffers: Vec::new() }
    }

    /// Takes a buffer from the pool if one is available, otherwise
    /// allocates a new one with the requested capacity hint.
    pub fn take(&mut self, capacity_hint: usize) -> Vec<u32> {
        match self.free_buffers.pop() {
            Some(mut buf) => {
                buf.clear();
                buf.reserve(capacity_hint.saturating_sub(buf.capacity()));
                buf
            }
            None => Vec::with_capacity(capacity_hint),
        }
    }

    /// Returns a buffer to the pool for reuse. Only call this once the
    /// buffer's owning [`MutationRun`] has been dropped and no other handle
    /// shares it, which in practice means this is the buffer the caller
    /// itself just finished constructing a run from and then discarded.
    pub fn give_back(&mut self, buf: Vec<u32>) {
        self.free_buffers.push(buf);
    }

    pub fn build_run(&mut self, mut buf: Vec<u32>) -> MutationRun {
        buf.sort_unstable();
        MutationRun::from_sorted(buf)
    }

    pub fn len(&self) -> usize {
        self.free_buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free_buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_buffer_is_empty_and_reused() {
        let mut pool = RunBufferPool::new();
        let mut buf = pool.take(8);
        buf.extend_from_slice(&[3, 1, 2]);
        pool.give_back(buf);
        assert_eq!(pool.len(), 1);

        let reused = pool.take(4);
        assert!(reused.is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn build_run_sorts_before_constructing() {
        let mut pool = RunBufferPool::new();
        let run = pool.build_run(vec![5, 1, 3]);
        assert_eq!(run.as_slice(), &[1, 3, 5]);
    }
}

use hashbrown::HashMap;

use super::mutation_run::MutationRun;

/// Coalesces a bulk operation applied across many haplosomes that may share
/// [`MutationRun`] allocations (spec §4.7 "Bulk-operation coalescer").
///
/// A bulk operation — e.g. "remove every mutation of type X across the
/// entire population" — touches every haplosome, but when most haplosomes
/// still share a handful of distinct run allocations (the common case right
/// after a generation swap, before much new mutation has diverged things),
/// transforming the same input run repeatedly wastes work. `BulkRunCache`
/// remembers the transformed output keyed by the input run's identity, so
/// the transformation runs once per distinct allocation no matter how many
/// haplosomes reference it.
#[derive(Default)]
pub struct BulkRunCache {
    cache: HashMap<usize, MutationRun>,
    hits: u64,
    misses: u64,
}

impl BulkRunCache {
    pub fn new() -> Self {
        BulkRunCache { cache: HashMap::new(), hits: 0, misses: 0 }
    }

    /// Returns the cached transform of `input` if one was already computed
    /// for a run sharing its identity, otherwise runs `compute`, caches the
    /// result, and returns it.
    pub fn get_or_compute(
        &mut self,
        input: &MutationRun,
        compute: impl FnOnce(&MutationRun) -> MutationRun,
    ) -> MutationRun {
        let key = input.identity();
        if let Some(cached) = self.cache.get(&key) {
            self.hits += 1;
            return cached.clone();
        }

        self.misses += 1;
        let result = compute(input);
        self.cache.insert(key, result.clone());
        result
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn distinct_inputs_seen(&self) -> usize {
        self.cache.len()
    }

    /// Clears accumulated entries. Called between bulk operations so one
    /// operation's cache never leaks into the next (their transforms are
    /// unrelated even when the input runs happen to coincide).
    pub fn reset(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_identical_input_is_computed_once() {
        let mut cache = BulkRunCache::new();
        let shared = MutationRun::from_sorted(vec![1, 2, 3]);
        let handles = vec![shared.clone(), shared.clone(), shared.clone()];

        let mut compute_calls = 0;
        for handle in &handles {
            cache.get_or_compute(handle, |run| {
                compute_calls += 1;
                let mut out = run.clone();
                out.make_mut().push(99);
                out
            });
        }

        assert_eq!(compute_calls, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.distinct_inputs_seen(), 1);
    }

    #[test]
    fn distinct_inputs_each_get_computed() {
        let mut cache = BulkRunCache::new();
        let a = MutationRun::from_sorted(vec![1]);
        let b = MutationRun::from_sorted(vec![2]);

        cache.get_or_compute(&a, |r| r.clone());
        cache.get_or_compute(&b, |r| r.clone());

        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.distinct_inputs_seen(), 2);
    }
}

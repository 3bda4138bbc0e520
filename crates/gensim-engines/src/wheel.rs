use gensim_core::prelude::random_provider::with_rng;

/// Fitness-proportional sampling with replacement, the mechanism spec §4.10
/// step 2 calls for: "sample parent pairs from the previous generation's
/// fitness-weighted distribution."
///
/// Normalizes a fitness vector into a cumulative distribution once, then
/// draws `count` independent uniform samples against it. A cumulative
/// lookup is `O(log n)` per draw rather than re-summing the wheel each time.
pub struct ProbabilityWheelIterator {
    cumulative: Vec<f64>,
    remaining: usize,
}

impl ProbabilityWheelIterator {
    /// `weights` must be non-negative; an all-zero vector falls back to a
    /// uniform distribution over every index, matching the degenerate case
    /// where every individual in a subpopulation has zero fitness (nobody is
    /// more likely to reproduce than anyone else).
    pub fn new(weights: &[f64], count: usize) -> Self {
        let total: f64 = weights.iter().sum();
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut acc = 0.0;
        if total > 0.0 {
            for &w in weights {
                acc += w.max(0.0);
                cumulative.push(acc / total);
            }
        } else {
            let n = weights.len().max(1) as f64;
            for i in 1..=weights.len() {
                cumulative.push(i as f64 / n);
            }
        }
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        ProbabilityWheelIterator { cumulative, remaining: count }
    }
}

impl Iterator for ProbabilityWheelIterator {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 || self.cumulative.is_empty() {
            return None;
        }
        self.remaining -= 1;
        let u: f64 = with_rng(|rng| rng.random());
        let index = self.cumulative.partition_point(|&c| c < u);
        Some(index.min(self.cumulative.len() - 1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

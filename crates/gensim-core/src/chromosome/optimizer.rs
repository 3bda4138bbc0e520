use std::collections::VecDeque;

use tracing::{debug, info};

/// Ring buffer capacity for per-tick runtimes at one mutrun count (spec
/// §4.5: "a ring buffer of per-tick runtimes at the current count (capacity
/// ≈ 50)").
pub const EXPERIMENT_LENGTH: usize = 50;

/// Hard ceiling on mutrun count, and the largest power-of-two multiplier
/// (spec §4.5 "Count domain").
pub const MAX_MUTRUN_COUNT: u32 = 1024;
pub const MAX_MULTIPLIER: u32 = 1024;

const INITIAL_STASIS_LIMIT: u64 = 10;
const INITIAL_STASIS_ALPHA: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Halving,
    Doubling,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Direction::Halving => Direction::Doubling,
            Direction::Doubling => Direction::Halving,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TuneOutcome {
    /// No decision yet; still accumulating samples.
    StillMeasuring,
    /// Committed to a new mutrun count; caller must re-lay-out every
    /// haplosome's mutrun vector (spec §4.5 "Transition rules").
    Transitioned { new_count: u32 },
    /// Reverted to the previous (better) count and entered stasis.
    Reverted { reverted_to: u32 },
    /// Inconclusive result; either extended the current trend or entered
    /// stasis without changing the count.
    NoChange,
}

/// Self-tuning mutation-run-count optimizer (spec §4.5). One instance lives
/// per [`super::chromosome::Chromosome`].
///
/// The search alternates between "experiments" (trying a candidate count
/// against the currently favored one) and "stasis" (holding the current
/// count for a while before re-probing a neighbor), following exactly the
/// two-phase search spec §4.5 describes. We measure wall-clock nanoseconds
/// per tick via [`MutationRunOptimizer::record_tick_elapsed`] rather than
/// SLiM's low-overhead CPU-cycle counters (spec §9: "in target languages
/// without low-overhead timers, measure wall time for phase batches").
pub struct MutationRunOptimizer {
    base_count: u32,
    multiplier: u32,
    direction: Direction,

    current_runtimes: VecDeque<f64>,
    previous_runtimes: VecDeque<f64>,
    previous_multiplier: u32,

    in_stasis: bool,
    stasis_limit: u64,
    stasis_alpha: f64,
    stasis_counter: u64,
    prev_stasis_multiplier_1: u32,
    prev_stasis_multiplier_2: u32,

    tick_accumulator: f64,
}

impl MutationRunOptimizer {
    pub fn new(base_count: u32) -> Self {
        MutationRunOptimizer {
            base_count: base_count.max(1),
            multiplier: 1,
            direction: Direction::Doubling,
            current_runtimes: VecDeque::with_capacity(EXPERIMENT_LENGTH),
            previous_runtimes: VecDeque::with_capacity(EXPERIMENT_LENGTH),
            previous_multiplier: 1,
            in_stasis: false,
            stasis_limit: INITIAL_STASIS_LIMIT,
            stasis_alpha: INITIAL_STASIS_ALPHA,
            stasis_counter: 0,
            prev_stasis_multiplier_1: 0,
            prev_stasis_multiplier_2: 0,
            tick_accumulator: 0.0,
        }
    }

    pub fn mutrun_count(&self) -> u32 {
        (self.base_count * self.multiplier).min(MAX_MUTRUN_COUNT)
    }

    /// Zeroes the per-tick clock. Call at phase start (spec §4.5
    /// "Per-tick protocol").
    pub fn begin_tick(&mut self) {
        self.tick_accumulator = 0.0;
    }

    /// Accumulates elapsed time from a measured phase into the running
    /// per-tick total.
    pub fn accumulate(&mut self, elapsed_secs: f64) {
        self.tick_accumulator += elapsed_secs;
    }

    /// Appends the tick's accumulated runtime to the current-count sample
    /// and, once both samples are full, runs the Welch comparison (spec
    /// §4.5 "at phase end, append the tick total... perform a Welch-style
    /// comparison").
    pub fn end_tick(&mut self) -> TuneOutcome {
        self.current_runtimes.push_back(self.tick_accumulator);
        if self.current_runtimes.len() > EXPERIMENT_LENGTH {
            self.current_runtimes.pop_front();
        }

        if self.current_runtimes.len() < EXPERIMENT_LENGTH || self.previous_runtimes.len() < EXPERIMENT_LENGTH {
            return TuneOutcome::StillMeasuring;
        }

        self.evaluate_experiment()
    }

    fn evaluate_experiment(&mut self) -> TuneOutcome {
        let alpha = if self.in_stasis { self.stasis_alpha } else { 0.05 };
        let comparison = welch_t_test(
            self.current_runtimes.make_contiguous(),
            self.previous_runtimes.make_contiguous(),
            alpha,
        );

        match comparison {
            Comparison::CurrentFaster if !self.in_stasis => {
                let committed = self.multiplier;
                self.start_new_experiment(self.next_multiplier_in_direction(self.direction));
                info!(committed, "mutrun optimizer: continuing trend after faster result");
                TuneOutcome::Transitioned { new_count: self.base_count * committed.max(1) }
            }
            Comparison::CurrentSlower if !self.in_stasis => {
                let reverted_to = self.previous_multiplier;
                self.multiplier = reverted_to;
                self.enter_stasis();
                debug!(reverted_to, "mutrun optimizer: reverting after slower result");
                TuneOutcome::Reverted { reverted_to: self.base_count * reverted_to.max(1) }
            }
            Comparison::Inconclusive if !self.in_stasis => {
                self.start_new_experiment(self.multiplier);
                TuneOutcome::NoChange
            }
            _ => {
                self.tick_stasis();
                TuneOutcome::NoChange
            }
        }
    }

    fn next_multiplier_in_direction(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Doubling => (self.multiplier * 2).min(MAX_MULTIPLIER),
            Direction::Halving => (self.multiplier / 2).max(1),
        }
    }

    fn start_new_experiment(&mut self, new_multiplier: u32) {
        self.previous_multiplier = self.multiplier;
        self.previous_runtimes = std::mem::take(&mut self.current_runtimes);
        self.multiplier = new_multiplier;
        self.current_runtimes.clear();
    }

    fn enter_stasis(&mut self) {
        self.in_stasis = true;
        self.stasis_counter = 0;
        self.prev_stasis_multiplier_2 = self.prev_stasis_multiplier_1;
        self.prev_stasis_multiplier_1 = self.multiplier;
        self.current_runtimes.clear();
        self.previous_runtimes.clear();
    }

    /// Grows `stasis_limit` and tightens `stasis_alpha` the longer stasis
    /// holds (spec §4.5 "Stasis: ... grows over time... alpha threshold
    /// tightens as stasis deepens"), and re-probes a neighboring count once
    /// the limit elapses.
    fn tick_stasis(&mut self) {
        self.stasis_counter += 1;
        if self.stasis_counter < self.stasis_limit {
            return;
        }

        self.stasis_limit = (self.stasis_limit * 2).min(100_000);
        self.stasis_alpha = (self.stasis_alpha * 0.5).max(1e-6);
        self.direction = self.direction.flip();
        self.in_stasis = false;
        self.start_new_experiment(self.next_multiplier_in_direction(self.direction));
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Comparison {
    CurrentFaster,
    CurrentSlower,
    Inconclusive,
}

/// Welch's two-sample t-test (unequal variances), one-tailed at `alpha`,
/// deciding whether `current`'s mean is significantly different from
/// `previous`'s (spec §4.5: "a Welch-style comparison (two-sample t-test)
/// between the two samples").
fn welch_t_test(current: &[f64], previous: &[f64], alpha: f64) -> Comparison {
    let n1 = current.len() as f64;
    let n2 = previous.len() as f64;
    if n1 < 2.0 || n2 < 2.0 {
        return Comparison::Inconclusive;
    }

    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let variance = |xs: &[f64], m: f64| xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() as f64 - 1.0);

    let m1 = mean(current);
    let m2 = mean(previous);
    let v1 = variance(current, m1);
    let v2 = variance(previous, m2);

    let se = (v1 / n1 + v2 / n2).sqrt();
    if se <= 0.0 {
        return Comparison::Inconclusive;
    }

    let t = (m1 - m2) / se;

    // Critical value approximation for a one-tailed test at the given alpha,
    // using the normal approximation (valid for the sample sizes this
    // optimizer runs with, EXPERIMENT_LENGTH = 50 on each side).
    let z_alpha = inverse_normal_cdf(1.0 - alpha);

    if t < -z_alpha {
        Comparison::CurrentFaster
    } else if t > z_alpha {
        Comparison::CurrentSlower
    } else {
        Comparison::Inconclusive
    }
}

/// Acklam's rational approximation to the inverse standard normal CDF,
/// accurate to about 1e-9 over (0, 1) — plenty for picking a t-test critical
/// value.
fn inverse_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let a = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    let b = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    let c = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    let d = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    let p_low = 0.02425;
    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= 1.0 - p_low {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_optimizer_starts_at_base_count() {
        let opt = MutationRunOptimizer::new(4);
        assert_eq!(opt.mutrun_count(), 4);
    }

    #[test]
    fn mutrun_count_never_exceeds_hard_ceiling() {
        let mut opt = MutationRunOptimizer::new(8);
        opt.multiplier = MAX_MULTIPLIER * 8;
        assert_eq!(opt.mutrun_count(), MAX_MUTRUN_COUNT);
    }

    #[test]
    fn still_measuring_until_both_samples_are_full() {
        let mut opt = MutationRunOptimizer::new(1);
        for _ in 0..EXPERIMENT_LENGTH - 1 {
            opt.begin_tick();
            opt.accumulate(1.0);
            assert_eq!(opt.end_tick(), TuneOutcome::StillMeasuring);
        }
    }

    #[test]
    fn faster_current_sample_commits_and_continues_trend() {
        let mut opt = MutationRunOptimizer::new(1);
        // Fill "previous" with slow runtimes by running one full experiment
        // of slow ticks, forcing a transition, then a fast one.
        for _ in 0..EXPERIMENT_LENGTH {
            opt.begin_tick();
            opt.accumulate(10.0);
            opt.end_tick();
        }
        let mut outcome = TuneOutcome::StillMeasuring;
        for _ in 0..EXPERIMENT_LENGTH {
            opt.begin_tick();
            opt.accumulate(1.0);
            outcome = opt.end_tick();
        }
        assert!(matches!(outcome, TuneOutcome::Transitioned { .. }));
    }

    #[test]
    fn inverse_normal_cdf_matches_known_quantiles() {
        assert!((inverse_normal_cdf(0.975) - 1.959964).abs() < 1e-3);
        assert!((inverse_normal_cdf(0.5)).abs() < 1e-9);
    }
}

use crate::domain::random_provider::RdRand;

/// Drawn mutation and breakpoint counts for one crossover-mutation call
/// (spec §4.6 step 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EventCounts {
    pub mutation_count: u32,
    pub breakpoint_count: u32,
}

/// Draws `(M, B)` using the joint-probability shortcut spec §4.6 step 1
/// describes: a single uniform draw decides, for each of "M is zero" and "B
/// is zero", which regime to fall into, before spending an RNG draw on a
/// (possibly truncated) Poisson count. This saves a draw in the common case
/// where both counts are zero, matching the original's joint-CDF approach.
///
/// `mutation_rate` and `breakpoint_rate` are the chromosome's overall rates
/// for this sex (spec §3's cached `overall_rate`).
pub fn draw_event_counts(rng: &mut RdRand<'_>, mutation_rate: f64, breakpoint_rate: f64) -> EventCounts {
    if mutation_rate <= 0.0 && breakpoint_rate <= 0.0 {
        return EventCounts::default();
    }

    let p_m_zero = (-mutation_rate).exp();
    let p_b_zero = (-breakpoint_rate).exp();

    // P(M=0 and B=0), P(M=0 and B>0), P(M>0 and B=0); the remaining mass is
    // P(M>0 and B>0), handled as the fallthrough case.
    let p_both_zero = p_m_zero * p_b_zero;
    let p_m_zero_b_nonzero = p_m_zero * (1.0 - p_b_zero);
    let p_m_nonzero_b_zero = (1.0 - p_m_zero) * p_b_zero;

    let u: f64 = rng.random();

    if u < p_both_zero {
        return EventCounts::default();
    }
    if u < p_both_zero + p_m_zero_b_nonzero {
        return EventCounts {
            mutation_count: 0,
            breakpoint_count: rng.poisson_nonzero(breakpoint_rate),
        };
    }
    if u < p_both_zero + p_m_zero_b_nonzero + p_m_nonzero_b_zero {
        return EventCounts {
            mutation_count: rng.poisson_nonzero(mutation_rate),
            breakpoint_count: 0,
        };
    }

    EventCounts {
        mutation_count: rng.poisson_nonzero(mutation_rate),
        breakpoint_count: rng.poisson_nonzero(breakpoint_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::random_provider::with_rng;

    #[test]
    fn zero_rates_always_yield_zero_counts() {
        with_rng(|rng| {
            for _ in 0..1000 {
                let counts = draw_event_counts(rng, 0.0, 0.0);
                assert_eq!(counts, EventCounts::default());
            }
        });
    }

    #[test]
    fn nonzero_mutation_rate_eventually_draws_mutations() {
        with_rng(|rng| {
            let any_nonzero = (0..2000).any(|_| draw_event_counts(rng, 0.5, 0.0).mutation_count > 0);
            assert!(any_nonzero);
        });
    }

    #[test]
    fn counts_are_consistent_with_rate_sign() {
        with_rng(|rng| {
            for _ in 0..500 {
                let counts = draw_event_counts(rng, 0.0, 2.0);
                assert_eq!(counts.mutation_count, 0);
            }
        });
    }
}

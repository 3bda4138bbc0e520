use crate::chromosome::{DsbParams, RateMap};
use crate::domain::random_provider::RdRand;

/// One recombination event at a genomic position (spec §4.6 step 2).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Breakpoint {
    /// A plain crossover: the active parental strand toggles permanently
    /// from this position onward.
    Crossover { position: i64 },
    /// A gene-conversion tract: the active strand toggles at `start` and
    /// toggles back at `end`, so strand identity outside `[start, end]` is
    /// unaffected (spec §4.6: "no junction switches strand outside the
    /// tract").
    GeneConversion { start: i64, end: i64, complex: bool },
}

impl Breakpoint {
    pub fn start(&self) -> i64 {
        match self {
            Breakpoint::Crossover { position } => *position,
            Breakpoint::GeneConversion { start, .. } => *start,
        }
    }
}

/// Picks a position uniformly distributed according to `map`'s
/// rate-weighted sub-intervals: first choose a sub-interval proportional to
/// its contribution to the overall rate, then a uniform offset within it
/// (spec §4.6 step 2).
pub fn draw_weighted_position(rng: &mut RdRand<'_>, map: &RateMap) -> i64 {
    let target = rng.range(0.0..map.overall_rate().max(f64::MIN_POSITIVE));
    let mut acc = 0.0;
    for (start, end, rate) in map.intervals() {
        let length = (end - start + 1) as f64;
        let contribution = rate * length;
        if rate > 0.0 && target < acc + contribution {
            let offset_into = (target - acc) / rate;
            return (start as f64 + offset_into).floor() as i64;
        }
        acc += contribution;
    }
    map.last_position()
}

/// Draws `count` breakpoints, resolving each as a crossover or gene
/// conversion tract per `dsb` (spec §4.6 step 2). Positions are not
/// deduplicated here; the caller sorts/merges them with new-mutation
/// positions when assembling child runs.
pub fn draw_breakpoints(
    rng: &mut RdRand<'_>,
    map: &RateMap,
    dsb: &DsbParams,
    count: u32,
    last_position: i64,
) -> Vec<Breakpoint> {
    let mut breakpoints = Vec::with_capacity(count as usize);

    for _ in 0..count {
        loop {
            let position = draw_weighted_position(rng, map);

            if !dsb.is_enabled() || !rng.bool(dsb.non_crossover_fraction as f32) {
                breakpoints.push(Breakpoint::Crossover { position });
                break;
            }

            let tract_length = (rng.geometric(dsb.mean_tract_length) + 1).max(1) as i64;
            let end = position + tract_length - 1;

            if end > last_position {
                if dsb.redraw_lengths_on_failure {
                    continue;
                }
                // Clamp the tract to the chromosome end rather than redraw
                // position, per spec §4.6: "either redraw positions or (if
                // redraw_lengths_on_failure) redraw the length as well."
                breakpoints.push(Breakpoint::GeneConversion {
                    start: position,
                    end: last_position,
                    complex: rng.bool(dsb.complex_tract_fraction as f32),
                });
                break;
            }

            breakpoints.push(Breakpoint::GeneConversion {
                start: position,
                end,
                complex: rng.bool(dsb.complex_tract_fraction as f32),
            });
            break;
        }
    }

    breakpoints.sort_by_key(|b| b.start());
    breakpoints
}

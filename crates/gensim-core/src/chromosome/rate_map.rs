use gensim_error::{GensimError, GensimResult};

/// A piecewise-constant rate map over `[0, last_position]` (spec §3
/// "Chromosome": "one or a pair of ... piecewise-constant mutation-rate
/// maps (end positions + rates + cached overall rate + cached
/// `exp(-overall_rate)` for fast Poisson draws)").
///
/// `ends[i]` is the last position (inclusive) covered by `rates[i]`; the
/// final entry's end must equal the chromosome's last position. Rates are
/// per-base-pair-per-generation probabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct RateMap {
    ends: Vec<i64>,
    rates: Vec<f64>,
    overall_rate: f64,
    exp_neg_overall_rate: f64,
}

impl RateMap {
    /// Builds a map from `(end_position, rate)` segments. `segments` must be
    /// sorted ascending by end position, non-empty, and every rate must be
    /// non-negative — anything else is a configuration error (spec §7).
    pub fn new(segments: Vec<(i64, f64)>) -> GensimResult<Self> {
        if segments.is_empty() {
            return Err(GensimError::config("rate map must have at least one segment"));
        }

        let mut ends = Vec::with_capacity(segments.len());
        let mut rates = Vec::with_capacity(segments.len());
        let mut prev_end = -1i64;
        let mut prev_start = 0i64;
        let mut overall_rate = 0.0;

        for (end, rate) in segments {
            if end <= prev_end {
                return Err(GensimError::config(format!(
                    "rate map segment ends must strictly increase (got {end} after {prev_end})"
                )));
            }
            if rate < 0.0 {
                return Err(GensimError::config(format!("rate map rate {rate} is negative")));
            }

            let length = (end - prev_start + 1) as f64;
            overall_rate += rate * length;
            prev_start = end + 1;
            prev_end = end;
            ends.push(end);
            rates.push(rate);
        }

        Ok(RateMap {
            ends,
            rates,
            overall_rate,
            exp_neg_overall_rate: (-overall_rate).exp(),
        })
    }

    pub fn uniform(last_position: i64, rate: f64) -> GensimResult<Self> {
        Self::new(vec![(last_position, rate)])
    }

    pub fn last_position(&self) -> i64 {
        *self.ends.last().expect("non-empty by construction")
    }

    /// Total expected number of events per generation across the whole
    /// chromosome: `sum(rate_i * length_i)`. Spec §4.6 step 1's joint draw
    /// and the cached `exp(-overall_rate)` both key off this value.
    pub fn overall_rate(&self) -> f64 {
        self.overall_rate
    }

    pub fn exp_neg_overall_rate(&self) -> f64 {
        self.exp_neg_overall_rate
    }

    /// The rate in effect at `position`.
    pub fn rate_at(&self, position: i64) -> f64 {
        let idx = self.ends.partition_point(|&end| end < position);
        self.rates.get(idx).copied().unwrap_or(0.0)
    }

    /// Number of piecewise segments.
    pub fn segment_count(&self) -> usize {
        self.ends.len()
    }

    /// Iterates `(start, end, rate)` sub-intervals in ascending order, used
    /// by crossover-mutation to pick a sub-interval proportional to its
    /// contribution to the overall rate (spec §4.6 step 2/3).
    pub fn intervals(&self) -> impl Iterator<Item = (i64, i64, f64)> + '_ {
        let mut start = 0i64;
        self.ends.iter().zip(self.rates.iter()).map(move |(&end, &rate)| {
            let this_start = start;
            start = end + 1;
            (this_start, end, rate)
        })
    }
}

/// Either a single shared map (hermaphroditic / non-sex-specific models) or
/// a male/female pair (spec §3: "if a single rate map is used, only the `_H_`
/// copy is populated; if sex-specific, both `_M_` and `_F_` copies are
/// populated").
#[derive(Clone, Debug, PartialEq)]
pub enum SexSpecificMap {
    Shared(RateMap),
    BySex { male: RateMap, female: RateMap },
}

impl SexSpecificMap {
    pub fn for_sex(&self, is_male: bool) -> &RateMap {
        match self {
            SexSpecificMap::Shared(map) => map,
            SexSpecificMap::BySex { male, female } => if is_male { male } else { female },
        }
    }

    pub fn is_sex_specific(&self) -> bool {
        matches!(self, SexSpecificMap::BySex { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_map_computes_overall_rate_over_full_length() {
        let map = RateMap::uniform(999, 1e-7).unwrap();
        assert!((map.overall_rate() - 1000.0 * 1e-7).abs() < 1e-12);
        assert_eq!(map.last_position(), 999);
    }

    #[test]
    fn rate_at_dispatches_to_correct_segment() {
        let map = RateMap::new(vec![(99, 0.0), (199, 1e-6)]).unwrap();
        assert_eq!(map.rate_at(50), 0.0);
        assert_eq!(map.rate_at(150), 1e-6);
    }

    #[test]
    fn non_increasing_ends_are_rejected() {
        assert!(RateMap::new(vec![(100, 1e-6), (50, 1e-6)]).is_err());
    }

    #[test]
    fn negative_rate_is_rejected() {
        assert!(RateMap::new(vec![(100, -1e-6)]).is_err());
    }

    #[test]
    fn intervals_cover_the_full_map_contiguously() {
        let map = RateMap::new(vec![(9, 0.1), (19, 0.2)]).unwrap();
        let intervals: Vec<_> = map.intervals().collect();
        assert_eq!(intervals, vec![(0, 9, 0.1), (10, 19, 0.2)]);
    }

    #[test]
    fn shared_map_ignores_sex() {
        let map = SexSpecificMap::Shared(RateMap::uniform(10, 1e-6).unwrap());
        assert!(!map.is_sex_specific());
        assert_eq!(map.for_sex(true).overall_rate(), map.for_sex(false).overall_rate());
    }
}

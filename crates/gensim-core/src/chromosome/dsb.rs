/// Double-strand-break / gene-conversion parameters (spec §3, §4.6 step 2).
///
/// When disabled (`non_crossover_fraction == 0.0`), every drawn breakpoint is
/// a plain crossover. When enabled, a fraction of breaks resolve as
/// non-crossover gene-conversion tracts instead of strand switches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DsbParams {
    /// Fraction of breaks that resolve as non-crossover (gene conversion)
    /// rather than crossover.
    pub non_crossover_fraction: f64,
    /// Mean gene-conversion tract length, used as the mean of a geometric
    /// draw (spec §4.6: "geometric with mean gene_conversion_avg_length").
    pub mean_tract_length: f64,
    /// Fraction of non-crossover tracts that are "complex" (record
    /// heteroduplex positions with a biased repair rule) rather than
    /// "simple".
    pub complex_tract_fraction: f64,
    /// Bias toward one strand's base at a heteroduplex mismatch position,
    /// in `[0, 1]`; `0.5` is unbiased.
    pub mismatch_repair_bias: f64,
    /// If a tract's span would run off the chromosome end, redraw the
    /// length (not just the position) rather than only retrying positions.
    pub redraw_lengths_on_failure: bool,
}

impl DsbParams {
    pub fn disabled() -> Self {
        DsbParams {
            non_crossover_fraction: 0.0,
            mean_tract_length: 0.0,
            complex_tract_fraction: 0.0,
            mismatch_repair_bias: 0.5,
            redraw_lengths_on_failure: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.non_crossover_fraction > 0.0
    }
}

impl Default for DsbParams {
    fn default() -> Self {
        Self::disabled()
    }
}

use gensim_error::{GensimError, GensimResult};

/// The mutrun count/length split for a chromosome (spec §3, §4.5 "Count
/// domain"): `run_count = base_count * multiplier`, `mutrun_length =
/// (last_position + 1) / run_count` rounded up so that
/// `run_count * mutrun_length - 1 >= last_position` always holds (spec §8
/// "Boundary behaviors").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutrunLayout {
    pub run_count: u32,
    pub mutrun_length: i64,
}

impl MutrunLayout {
    /// `multiplier` must be a power of two in `[1, 1024]` (spec §4.5).
    pub fn new(last_position: i64, base_count: u32, multiplier: u32) -> GensimResult<Self> {
        if multiplier == 0 || (multiplier & (multiplier - 1)) != 0 {
            return Err(GensimError::config(format!(
                "mutrun multiplier {multiplier} is not a power of two"
            )));
        }
        if multiplier > 1024 {
            return Err(GensimError::config(format!(
                "mutrun multiplier {multiplier} exceeds the hard ceiling of 1024"
            )));
        }
        if last_position < 0 {
            return Err(GensimError::config("chromosome last_position must be non-negative"));
        }

        let run_count = base_count.max(1) * multiplier;
        let length = last_position + 1;
        let mutrun_length = length.div_ceil(run_count as i64).max(1);

        let layout = MutrunLayout { run_count, mutrun_length };
        layout.validate(last_position)?;
        Ok(layout)
    }

    /// Spec §8: "A chromosome of length `L` with `count * length - 1 ==
    /// L - 1` is valid; `count * length - 1 < L - 1` is fatal."
    pub fn validate(&self, last_position: i64) -> GensimResult<()> {
        let covered = self.run_count as i64 * self.mutrun_length - 1;
        if covered < last_position {
            return Err(GensimError::config(format!(
                "mutrun layout covers only up to position {covered}, but chromosome extends to {last_position}"
            )));
        }
        Ok(())
    }

    pub fn mutrun_index_for(&self, position: i64) -> usize {
        (position / self.mutrun_length) as usize
    }

    pub fn slot_bounds(&self, mutrun_index: usize) -> (i64, i64) {
        let start = mutrun_index as i64 * self.mutrun_length;
        (start, start + self.mutrun_length - 1)
    }
}

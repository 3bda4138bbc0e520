use crate::domain::random_provider::with_rng;

use super::types::Nucleotide;

/// Output shape requested from [`random_nucleotides`] (spec §6
/// "Random-nucleotide generator contract").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NucleotideFormat {
    String,
    Char,
    Integer,
}

/// A batch of randomly drawn nucleotides, shaped per the requested
/// [`NucleotideFormat`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NucleotideOutput {
    String(String),
    Char(Vec<String>),
    Integer(Vec<u8>),
}

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Draws `length` nucleotides independently, each weighted by `basis` (a
/// 4-vector over A/C/G/T, normalized; `None` is uniform) and shaped per
/// `format` (spec §6).
pub fn random_nucleotides(length: usize, basis: Option<[f64; 4]>, format: NucleotideFormat) -> NucleotideOutput {
    let weights = basis.unwrap_or([0.25, 0.25, 0.25, 0.25]);
    let total: f64 = weights.iter().sum();
    let mut cumulative = [0.0f64; 4];
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        acc += w.max(0.0);
        cumulative[i] = if total > 0.0 { acc / total } else { (i + 1) as f64 / 4.0 };
    }
    cumulative[3] = 1.0;

    let indices: Vec<u8> = (0..length)
        .map(|_| {
            let u: f64 = with_rng(|rng| rng.random());
            cumulative.iter().position(|&c| u < c).unwrap_or(3) as u8
        })
        .collect();

    match format {
        NucleotideFormat::Integer => NucleotideOutput::Integer(indices),
        NucleotideFormat::Char => NucleotideOutput::Char(indices.iter().map(|&i| BASES[i as usize].to_string()).collect()),
        NucleotideFormat::String => NucleotideOutput::String(indices.iter().map(|&i| BASES[i as usize]).collect()),
    }
}

/// Converts a drawn index (0..=3) to its [`Nucleotide`] variant, the bridge
/// between this generator and mutation records that carry a nucleotide.
pub fn nucleotide_from_index(index: u8) -> Nucleotide {
    Nucleotide::from_index(index)
}

use std::collections::HashSet;
use std::fmt::Write as _;

use gensim_core::prelude::{Chromosome, Haplosome, MutationRegistry};
use gensim_error::{GensimError, GensimResult};

/// Renders MS format for a sample of haplosomes on one chromosome (spec §6
/// "MS format"): a `//` separator, `segsites:`/`positions:` header lines,
/// then one `0`/`1` string per haplosome over the segregating sites found in
/// the sample.
pub fn write_ms(chromosome: &Chromosome, registry: &MutationRegistry, haplosomes: &[&Haplosome]) -> GensimResult<String> {
    let mut sites = Vec::new();
    let mut seen = HashSet::new();
    for haplosome in haplosomes {
        if !haplosome.is_populated() {
            continue;
        }
        for run in haplosome.mutruns()? {
            for &index in run.as_slice() {
                if seen.insert(index) {
                    sites.push((index, registry.get(index)?.position));
                }
            }
        }
    }
    sites.sort_by_key(|&(_, position)| position);

    let last_position = chromosome.last_position().max(1) as f64;
    let mut out = String::new();
    writeln!(out, "//").map_err(fmt_err)?;
    writeln!(out, "segsites: {}", sites.len()).map_err(fmt_err)?;
    write!(out, "positions:").map_err(fmt_err)?;
    for &(_, position) in &sites {
        write!(out, " {:.15}", position as f64 / last_position).map_err(fmt_err)?;
    }
    out.push('\n');

    for haplosome in haplosomes {
        if !haplosome.is_populated() {
            out.extend(std::iter::repeat('0').take(sites.len()));
            out.push('\n');
            continue;
        }
        let runs = haplosome.mutruns()?;
        for &(index, _) in &sites {
            let present = runs.iter().any(|run| run.contains(index));
            out.push(if present { '1' } else { '0' });
        }
        out.push('\n');
    }

    Ok(out)
}

fn fmt_err(_: std::fmt::Error) -> GensimError {
    GensimError::io("failed to format MS output")
}

#[cfg(test)]
mod tests {
    use gensim_core::prelude::{
        ChromosomeBuilder, ChromosomeType, GenomicElementType, MutationTypeProportion, MutationRun, RateMap,
        SexSpecificMap,
    };

    use super::*;

    fn chromosome() -> Chromosome {
        let element_type = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
        let rate = SexSpecificMap::Shared(RateMap::uniform(999, 0.0).unwrap());
        ChromosomeBuilder::new(0, "I", ChromosomeType::Autosome, 999, rate.clone(), rate)
            .genomic_element_types(vec![element_type])
            .build()
            .unwrap()
    }

    #[test]
    fn segregating_site_count_matches_distinct_positions() {
        let chromosome = chromosome();
        let mutation = gensim_core::prelude::Mutation::new(0, 0, 100, 0, 0, gensim_core::prelude::Nucleotide::None);
        let mut registry = MutationRegistry::new(1);
        let mutation_index = registry.register(mutation, 2).unwrap();
        let run = MutationRun::from_sorted(vec![mutation_index]);
        let h1 = Haplosome::new_populated(0, vec![run.clone()]);
        let h2 = Haplosome::new_populated(0, vec![MutationRun::empty()]);
        let output = write_ms(&chromosome, &registry, &[&h1, &h2]).unwrap();
        assert!(output.contains("segsites: 1"));
        assert!(output.contains("1\n"));
        assert!(output.contains("0\n"));
    }
}

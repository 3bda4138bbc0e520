use std::fmt::Write as _;

use gensim_core::prelude::{Chromosome, MutationRegistry};
use gensim_error::{GensimError, GensimResult};

use crate::population::Population;

/// Renders the line-oriented ASCII population snapshot (spec §6 "Population
/// snapshot, text form"): a header, a `Mutations:` block listing every live
/// mutation, then a `Haplosomes:` block listing every populated haplosome's
/// mutation ids.
///
/// Multi-chromosome models carry the chromosome symbol field in each
/// mutation line; single-chromosome models omit it for backward
/// compatibility with the original format.
pub fn write_text_snapshot(
    header: &str,
    chromosomes: &[Chromosome],
    registry: &MutationRegistry,
    population: &Population,
) -> GensimResult<String> {
    let mut out = String::new();
    let multi_chromosome = chromosomes.len() > 1;

    writeln(&mut out, header)?;
    writeln(&mut out, "Mutations:")?;
    for (index, mutation) in registry.block().iter_live() {
        let info = registry.traits().get(0, index);
        write_field(&mut out, index)?;
        write!(&mut out, " {}", mutation.muttype_id).map_err(fmt_err)?;
        write!(&mut out, " {}", mutation.position).map_err(fmt_err)?;
        if multi_chromosome {
            let symbol = chromosomes
                .get(mutation.chromosome_index as usize)
                .map(Chromosome::symbol)
                .unwrap_or("?");
            write!(&mut out, " {symbol}").map_err(fmt_err)?;
        }
        write!(&mut out, " {} {}", info.effect, info.dominance).map_err(fmt_err)?;
        write!(&mut out, " {} {}", mutation.origin_subpop_id, mutation.origin_tick).map_err(fmt_err)?;
        if mutation.nucleotide != gensim_core::prelude::Nucleotide::None {
            write!(&mut out, " {}", mutation.nucleotide.as_signed_byte()).map_err(fmt_err)?;
        }
        out.push('\n');
    }

    writeln(&mut out, "Haplosomes:")?;
    for subpop in population.subpopulations() {
        for (i, individual) in subpop.individuals().iter().enumerate() {
            for haplosome in individual.haplosomes() {
                if !haplosome.is_populated() {
                    continue;
                }
                write!(&mut out, "p{}:i{}", subpop.id(), i).map_err(fmt_err)?;
                for run in haplosome.mutruns()? {
                    for &index in run.as_slice() {
                        write!(&mut out, " {index}").map_err(fmt_err)?;
                    }
                }
                out.push('\n');
            }
        }
    }

    Ok(out)
}

fn write_field(out: &mut String, index: u32) -> GensimResult<()> {
    write!(out, "{index}").map_err(fmt_err)
}

fn writeln(out: &mut String, line: &str) -> GensimResult<()> {
    out.push_str(line);
    out.push('\n');
    Ok(())
}

fn fmt_err(_: std::fmt::Error) -> GensimError {
    GensimError::io("failed to format snapshot output")
}

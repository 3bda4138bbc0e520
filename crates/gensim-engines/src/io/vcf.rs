use std::collections::BTreeMap;
use std::fmt::Write as _;

use gensim_core::prelude::{Chromosome, Haplosome, MutationIndex, MutationRegistry, Nucleotide};
use gensim_error::{GensimError, GensimResult};

use crate::individual::Individual;
use crate::population::Population;

/// Renders VCF for every live mutation on `chromosome_index` across the
/// population's individuals (spec §6 "VCF format"): standard columns plus
/// the SLiM-style `MID`/`S`/`DOM`/`PO`/`TO`/`MT`/`AC`/`DP`/`AA` INFO fields
/// and `MULTIALLELIC`/`NONNUC` flags. Genotype calls are `0|1` pairs for a
/// diploid sample, a bare `0`/`1` for a haploid one, and `~` where the
/// individual carries no genetic content at this chromosome (e.g. Y in a
/// female).
pub fn write_vcf(
    chromosome: &Chromosome,
    chromosome_index: usize,
    registry: &MutationRegistry,
    population: &Population,
) -> GensimResult<String> {
    let mut out = String::new();
    write_header(&mut out, population)?;

    let mut by_position: BTreeMap<i64, Vec<MutationIndex>> = BTreeMap::new();
    for (index, mutation) in registry.block().iter_live() {
        if mutation.chromosome_index as usize == chromosome_index {
            by_position.entry(mutation.position).or_default().push(index);
        }
    }

    for (position, indices) in &by_position {
        let multiallelic = indices.len() > 1;
        for &index in indices {
            write_site_row(&mut out, chromosome, *position, index, multiallelic, registry, chromosome_index, population)?;
        }
    }

    Ok(out)
}

fn write_header(out: &mut String, population: &Population) -> GensimResult<()> {
    writeln!(out, "##fileformat=VCFv4.2").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=MID,Number=1,Type=Integer,Description=\"Mutation ID\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=S,Number=1,Type=Float,Description=\"Selection coefficient\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=DOM,Number=1,Type=Float,Description=\"Dominance coefficient\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=PO,Number=1,Type=Integer,Description=\"Subpopulation of origin\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=TO,Number=1,Type=Integer,Description=\"Tick of origin\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=MT,Number=1,Type=Integer,Description=\"Mutation type id\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=AC,Number=1,Type=Integer,Description=\"Allele count\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total depth\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=AA,Number=1,Type=Character,Description=\"Ancestral allele\">").map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=MULTIALLELIC,Number=0,Type=Flag,Description=\"Site has more than one segregating mutation\">")
        .map_err(fmt_err)?;
    writeln!(out, "##INFO=<ID=NONNUC,Number=0,Type=Flag,Description=\"Mutation is not nucleotide-based\">").map_err(fmt_err)?;
    writeln!(out, "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">").map_err(fmt_err)?;
    write!(out, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT").map_err(fmt_err)?;
    for subpop in population.subpopulations() {
        for i in 0..subpop.size() {
            write!(out, "\tp{}:i{i}", subpop.id()).map_err(fmt_err)?;
        }
    }
    out.push('\n');
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_site_row(
    out: &mut String,
    chromosome: &Chromosome,
    position: i64,
    index: MutationIndex,
    multiallelic: bool,
    registry: &MutationRegistry,
    chromosome_index: usize,
    population: &Population,
) -> GensimResult<()> {
    let mutation = registry.get(index)?;
    let info = registry.traits().get(0, index);
    let ac = allele_count(population, chromosome_index, index)?;
    let nonnuc = mutation.nucleotide == Nucleotide::None;

    write!(out, "{}\t{}\t.\tA\tT\t.\t.\t", chromosome.symbol(), position + 1).map_err(fmt_err)?;
    write!(
        out,
        "MID={};S={};DOM={};PO={};TO={};MT={};AC={};DP=1000",
        mutation.id, info.effect, info.dominance, mutation.origin_subpop_id, mutation.origin_tick, mutation.muttype_id, ac
    )
    .map_err(fmt_err)?;
    if !nonnuc {
        write!(out, ";AA={}", nucleotide_letter(mutation.nucleotide)).map_err(fmt_err)?;
    }
    if multiallelic {
        write!(out, ";MULTIALLELIC").map_err(fmt_err)?;
    }
    if nonnuc {
        write!(out, ";NONNUC").map_err(fmt_err)?;
    }
    write!(out, "\tGT").map_err(fmt_err)?;

    for subpop in population.subpopulations() {
        for individual in subpop.individuals() {
            write!(out, "\t{}", genotype(individual, chromosome_index, index)?).map_err(fmt_err)?;
        }
    }
    out.push('\n');
    Ok(())
}

fn genotype(individual: &Individual, chromosome_index: usize, index: MutationIndex) -> GensimResult<String> {
    let a = individual.haplosome(chromosome_index, 0).ok().filter(|h| h.is_populated());
    let b = individual.haplosome(chromosome_index, 1).ok().filter(|h| h.is_populated());
    match (a, b) {
        (Some(ha), Some(hb)) => Ok(format!("{}|{}", call(ha, index)? as u8, call(hb, index)? as u8)),
        (Some(ha), None) => Ok(format!("{}", call(ha, index)? as u8)),
        (None, Some(hb)) => Ok(format!("{}", call(hb, index)? as u8)),
        (None, None) => Ok("~".to_string()),
    }
}

fn call(haplosome: &Haplosome, index: MutationIndex) -> GensimResult<bool> {
    Ok(haplosome.mutruns()?.iter().any(|run| run.contains(index)))
}

fn allele_count(population: &Population, chromosome_index: usize, index: MutationIndex) -> GensimResult<u32> {
    let mut count = 0;
    for subpop in population.subpopulations() {
        for individual in subpop.individuals() {
            for copy in 0..2 {
                if let Ok(h) = individual.haplosome(chromosome_index, copy) {
                    if h.is_populated() && call(h, index)? {
                        count += 1;
                    }
                }
            }
        }
    }
    Ok(count)
}

fn nucleotide_letter(n: Nucleotide) -> char {
    match n {
        Nucleotide::A => 'A',
        Nucleotide::C => 'C',
        Nucleotide::G => 'G',
        Nucleotide::T => 'T',
        Nucleotide::None => 'N',
    }
}

fn fmt_err(_: std::fmt::Error) -> GensimError {
    GensimError::io("failed to format VCF output")
}

#[cfg(test)]
mod tests {
    use gensim_core::prelude::{
        ChromosomeBuilder, ChromosomeType, GenomicElementType, Mutation, MutationRun, MutationTypeProportion, RateMap,
        SexSpecificMap,
    };

    use super::*;
    use crate::sex::Sex;
    use crate::subpopulation::Subpopulation;

    fn chromosome() -> Chromosome {
        let element_type = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
        let rate = SexSpecificMap::Shared(RateMap::uniform(999, 0.0).unwrap());
        ChromosomeBuilder::new(0, "I", ChromosomeType::Autosome, 999, rate.clone(), rate)
            .genomic_element_types(vec![element_type])
            .build()
            .unwrap()
    }

    #[test]
    fn null_haplosome_pair_emits_tilde() {
        let chromosome = chromosome();
        let mutation = Mutation::new(0, 0, 10, 0, 0, Nucleotide::None);
        let mut registry = MutationRegistry::new(1);
        registry.register(mutation, 2).unwrap();

        let mut population = Population::new();
        let mut subpop = Subpopulation::new(0, "p0");
        subpop.push(Individual::new(0, 0, Sex::Female, -1, -1, vec![Haplosome::new_null(0), Haplosome::new_null(0)]));
        population.add_subpopulation(subpop);

        let output = write_vcf(&chromosome, 0, &registry, &population).unwrap();
        assert!(output.contains("\t~\n"));
    }

    #[test]
    fn diploid_carrier_emits_pipe_genotype() {
        let chromosome = chromosome();
        let mutation = Mutation::new(0, 0, 10, 0, 0, Nucleotide::None);
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(mutation, 2).unwrap();

        let mut population = Population::new();
        let mut subpop = Subpopulation::new(0, "p0");
        let run = MutationRun::from_sorted(vec![index]);
        subpop.push(Individual::new(
            0,
            0,
            Sex::Hermaphrodite,
            -1,
            -1,
            vec![Haplosome::new_populated(0, vec![run]), Haplosome::new_populated(0, vec![MutationRun::empty()])],
        ));
        population.add_subpopulation(subpop);

        let output = write_vcf(&chromosome, 0, &registry, &population).unwrap();
        assert!(output.contains("AC=1"));
        assert!(output.contains("\t1|0\n"));
    }
}

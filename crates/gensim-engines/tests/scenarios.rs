//! End-to-end scenarios exercising the species tick loop and VCF rendering.

use gensim_core::prelude::{
    Chromosome, ChromosomeBuilder, ChromosomeType, GenomicElement, GenomicElementType, Haplosome, MutationRegistry,
    MutationRun, MutationTypeProportion, RateMap, SexSpecificMap,
};
use gensim_core::TraitCombination;
use gensim_engines::io::write_vcf;
use gensim_engines::{Individual, Population, Sex, Species, Subpopulation};

fn no_event_autosome() -> Chromosome {
    let element_type = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
    let rate = SexSpecificMap::Shared(RateMap::uniform(99, 0.0).unwrap());
    ChromosomeBuilder::new(0, "I", ChromosomeType::Autosome, 99, rate.clone(), rate)
        .genomic_element_types(vec![element_type])
        .genomic_elements(vec![GenomicElement { start: 0, end: 99, element_type_id: 0 }])
        .build()
        .unwrap()
}

fn y_only_chromosome() -> Chromosome {
    let element_type = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
    let rate = SexSpecificMap::Shared(RateMap::uniform(49, 0.0).unwrap());
    ChromosomeBuilder::new(0, "Y", ChromosomeType::Y, 49, rate.clone(), rate)
        .genomic_element_types(vec![element_type])
        .genomic_elements(vec![GenomicElement { start: 0, end: 49, element_type_id: 0 }])
        .build()
        .unwrap()
}

/// Scenario 1: "Empty chromosome." A zero-rate autosome over five ticks
/// keeps subpopulation size constant and advances the tick counter, without
/// fabricating any mutation.
#[test]
fn empty_chromosome_tick_loop_preserves_population_size() {
    let mut species = Species::new(vec![no_event_autosome()], 1, TraitCombination::Additive);
    species.add_subpopulation("p0", 10, None).unwrap();

    for _ in 0..5 {
        species.run_tick().unwrap();
        assert_eq!(species.population().total_size(), 10);
    }

    assert_eq!(species.tick(), 5);
    assert!(species.registry().block().iter_live().next().is_none(), "zero mutation rate must never register a mutation");
}

/// Scenario 6: "Null-haplosome VCF." A Y-only chromosome output for a
/// subpopulation of females and males must show `~` for females and a bare
/// `0`/`1` call for males, and the `CHROM` column must carry the
/// chromosome's symbol.
#[test]
fn y_chromosome_vcf_shows_tilde_for_females_and_haploid_calls_for_males() {
    let chromosome = y_only_chromosome();
    let mut registry = MutationRegistry::new(1);
    let mutation = gensim_core::prelude::Mutation::new(0, 0, 25, 0, 0, gensim_core::prelude::Nucleotide::None);
    let index = registry.register(mutation, 1).unwrap();

    let mut population = Population::new();
    let mut subpop = Subpopulation::new(0, "p0");

    for _ in 0..3 {
        subpop.push(Individual::new(
            subpop.size() as u64,
            0,
            Sex::Female,
            -1,
            -1,
            vec![Haplosome::new_null(0), Haplosome::new_null(0)],
        ));
    }

    let carrying_run = MutationRun::from_sorted(vec![index]);
    subpop.push(Individual::new(
        100,
        0,
        Sex::Male,
        -1,
        -1,
        vec![Haplosome::new_populated(0, vec![carrying_run]), Haplosome::new_null(0)],
    ));
    subpop.push(Individual::new(
        101,
        0,
        Sex::Male,
        -1,
        -1,
        vec![Haplosome::new_populated(0, vec![MutationRun::empty()]), Haplosome::new_null(0)],
    ));

    population.add_subpopulation(subpop);

    let vcf = write_vcf(&chromosome, 0, &registry, &population).unwrap();
    assert!(vcf.contains("\t~\t~\t~\t1\t0\n"), "expected three tildes then a carrier and a non-carrier male call:\n{vcf}");
    assert!(vcf.lines().any(|line| line.starts_with("Y\t26\t")), "CHROM column must be the chromosome symbol, POS 1-based");
}

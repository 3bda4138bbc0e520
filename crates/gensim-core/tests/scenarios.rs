//! End-to-end scenarios over the genetic-state engine: mutation fixation,
//! stacking policy, bulk-operation run sharing, and DSB gene conversion.

use hashbrown::HashMap;

use gensim_core::prelude::*;
use gensim_core::{BulkRunCache, MutationState, draw_breakpoints};

fn uniform_chromosome(last_position: i64, mutation_rate: f64, muttype_id: u32) -> Chromosome {
    let element_type = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id, weight: 1.0 }]).unwrap();
    ChromosomeBuilder::new(
        0,
        "I",
        ChromosomeType::Autosome,
        last_position,
        SexSpecificMap::Shared(RateMap::uniform(last_position, mutation_rate).unwrap()),
        SexSpecificMap::Shared(RateMap::uniform(last_position, 0.0).unwrap()),
    )
    .genomic_element_types(vec![element_type])
    .genomic_elements(vec![GenomicElement { start: 0, end: last_position, element_type_id: 0 }])
    .build()
    .unwrap()
}

/// Scenario 2: "Single mutation fixation." A mutation carried by every
/// haplosome in a population, once tallied, must cross the fixation
/// threshold and retire into the substitution list.
#[test]
fn mutation_present_in_every_haplosome_is_retired_as_fixed() {
    let mut registry = MutationRegistry::new(1);
    let mutation = Mutation::new(0, 0, 500, 0, 0, Nucleotide::None);
    let index = registry.register(mutation, 0).unwrap();

    let total_haplosomes = 200u32; // 100 diploid individuals
    registry.zero_refcounts();
    for _ in 0..total_haplosomes {
        registry.bump_reference(index);
    }
    assert_eq!(registry.refcount(index), total_haplosomes);

    let report = registry.sweep(total_haplosomes, 1).unwrap();
    assert_eq!(report.fixed, 1);
    assert_eq!(report.removed, 0);
    assert!(registry.get(index).is_err(), "fixed mutation must leave the live block");
    assert_eq!(registry.substitutions().len(), 1);
    assert_eq!(registry.substitutions().iter().next().unwrap().origin_tick, 0);
}

/// Scenario 3: "Stacking policy keep-last." Inserting a second mutation from
/// the same stack group at the same position must displace the first.
#[test]
fn keep_last_stacking_leaves_only_the_newest_mutation_at_a_position() {
    let mut run = MutationRun::from_sorted(vec![]);
    let a: MutationIndex = 10;
    let b: MutationIndex = 11;

    run.insert_with_stacking(a, 0, StackGroup::Group(0), StackPolicy::KeepLast, &[]).unwrap();
    assert_eq!(run.as_slice(), &[a]);

    run.insert_with_stacking(b, 0, StackGroup::Group(0), StackPolicy::KeepLast, &[a]).unwrap();
    assert_eq!(run.as_slice(), &[b], "keep-last must remove the prior group member before inserting");
}

/// Scenario 4: "Bulk-operation sharing." Two haplosomes referencing the same
/// run must resolve a bulk transform to the same output allocation, and the
/// original run must stay unchanged.
#[test]
fn bulk_cache_coalesces_shared_input_runs_into_one_output() {
    let shared = MutationRun::from_sorted(vec![1, 2, 3]);
    let mut h1 = Haplosome::new_populated(0, vec![shared.clone(), MutationRun::empty(), MutationRun::empty()]);
    let mut h2 = Haplosome::new_populated(0, vec![shared.clone(), MutationRun::empty(), MutationRun::empty()]);
    assert!(h1.mutruns().unwrap()[0].ptr_eq(&h2.mutruns().unwrap()[0]));

    let mut cache = BulkRunCache::new();
    let new_mutation: MutationIndex = 42;
    for haplosome in [&mut h1, &mut h2] {
        let runs = haplosome.mutruns_mut().unwrap();
        let transformed = cache.get_or_compute(&runs[0], |input| {
            let mut out = input.clone();
            out.make_mut().push(new_mutation);
            out
        });
        runs[0] = transformed;
    }

    assert!(h1.mutruns().unwrap()[0].ptr_eq(&h2.mutruns().unwrap()[0]), "both haplosomes must share the new output run");
    assert_eq!(h1.mutruns().unwrap()[0].as_slice(), &[1, 2, 3, 42]);
    assert_eq!(shared.as_slice(), &[1, 2, 3], "the original run must be untouched");
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.hits(), 1);
}

/// Scenario 5: "DSB gene conversion." With a high non-crossover fraction,
/// most drawn breaks resolve as tracts of roughly the configured mean
/// length, and tracts never exceed the chromosome's bounds.
#[test]
fn dsb_enabled_mostly_yields_bounded_gene_conversion_tracts() {
    let map = RateMap::uniform(9_999, 1e-4).unwrap();
    let dsb = DsbParams {
        non_crossover_fraction: 0.9,
        mean_tract_length: 100.0,
        complex_tract_fraction: 0.0,
        mismatch_repair_bias: 0.5,
        redraw_lengths_on_failure: false,
    };

    let mut gene_conversions = 0u32;
    let mut total_tract_length = 0i64;
    let draws = 2_000u32;

    random_provider::with_rng(|rng| {
        let breakpoints = draw_breakpoints(rng, &map, &dsb, draws, 9_999);
        assert_eq!(breakpoints.len(), draws as usize);
        for bp in breakpoints {
            match bp {
                Breakpoint::GeneConversion { start, end, .. } => {
                    assert!(end >= start);
                    assert!(end <= 9_999);
                    gene_conversions += 1;
                    total_tract_length += end - start + 1;
                }
                Breakpoint::Crossover { position } => assert!((0..=9_999).contains(&position)),
            }
        }
    });

    let fraction = gene_conversions as f64 / draws as f64;
    assert!(fraction > 0.75, "expected most breaks to resolve as gene conversion, got {fraction}");

    let mean_length = total_tract_length as f64 / gene_conversions as f64;
    assert!((20.0..300.0).contains(&mean_length), "mean tract length {mean_length} far from configured mean 100");
}

/// A registered mutation starts in the registry state and a sweep with a
/// fixation threshold above its refcount leaves it in circulation.
#[test]
fn segregating_mutation_survives_a_sweep_below_fixation_threshold() {
    let mut registry = MutationRegistry::new(1);
    let mutation = Mutation::new(0, 0, 10, 0, 0, Nucleotide::None);
    let index = registry.register(mutation, 1).unwrap();
    assert_eq!(registry.get(index).unwrap().state, MutationState::InRegistry);

    let report = registry.sweep(200, 1).unwrap();
    assert_eq!(report.removed, 0);
    assert_eq!(report.fixed, 0);
    assert!(registry.get(index).is_ok());
}

/// Crossover-mutation over a zero-rate chromosome produces a child haplosome
/// whose single run is pointer-identical to its parent's — no deep copy when
/// nothing changed (the "round-trip / idempotence" property).
#[test]
fn zero_rate_crossover_shares_the_parental_run_allocation() {
    let chromosome = uniform_chromosome(99, 0.0, 0);
    let run = MutationRun::from_sorted(vec![]);
    let strand1 = Haplosome::new_populated(0, vec![run.clone()]);
    let strand2 = Haplosome::new_populated(0, vec![run]);
    let mut registry = MutationRegistry::new(1);
    let muttypes: HashMap<u32, MutationType> = HashMap::new();

    let output = crossover_mutation(&chromosome, &strand1, &strand2, false, 0, 0, &mut registry, &muttypes).unwrap();
    assert!(output.haplosome.mutruns().unwrap()[0].ptr_eq(&strand1.mutruns().unwrap()[0]));
}

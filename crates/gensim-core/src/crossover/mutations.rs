use crate::chromosome::{Chromosome, RateMap};
use crate::domain::random_provider::RdRand;

/// A "GESubrange": the intersection of one mutation-rate-map interval with
/// one genomic element, weighted by `rate * length` (spec §4.6 step 3:
/// "Distribute `M` mutations across sub-intervals proportional to
/// mutation-rate-weighted sub-interval lengths (intersection of rate-map
/// intervals with genomic-element intervals)").
#[derive(Clone, Copy, Debug, PartialEq)]
struct GeSubrange {
    start: i64,
    end: i64,
    weight: f64,
}

fn build_subranges(chromosome: &Chromosome, map: &RateMap) -> Vec<GeSubrange> {
    let mut subranges = Vec::new();
    for element in chromosome.genomic_elements() {
        for (rstart, rend, rate) in map.intervals() {
            if rate <= 0.0 {
                continue;
            }
            let start = element.start.max(rstart);
            let end = element.end.min(rend);
            if start > end {
                continue;
            }
            let length = (end - start + 1) as f64;
            subranges.push(GeSubrange { start, end, weight: rate * length });
        }
    }
    subranges
}

/// Draws `count` new-mutation positions, sorted and deduplicated (spec §4.6
/// step 3: "Sort and unique the position list (collisions at the same base
/// pair are resolved by the stacking policy when inserting)").
pub fn draw_mutation_positions(rng: &mut RdRand<'_>, chromosome: &Chromosome, map: &RateMap, count: u32) -> Vec<i64> {
    let subranges = build_subranges(chromosome, map);
    if subranges.is_empty() || count == 0 {
        return Vec::new();
    }

    let total_weight: f64 = subranges.iter().map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    let mut positions = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let target = rng.range(0.0..total_weight);
        let mut acc = 0.0;
        let mut chosen = subranges.last().copied().expect("non-empty checked above");
        for sub in &subranges {
            if target < acc + sub.weight {
                chosen = *sub;
                break;
            }
            acc += sub.weight;
        }

        let offset = rng.range(0..(chosen.end - chosen.start + 1));
        positions.push(chosen.start + offset);
    }

    positions.sort_unstable();
    positions.dedup();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{ChromosomeBuilder, ChromosomeType, GenomicElement, GenomicElementType, MutationTypeProportion, SexSpecificMap};
    use crate::domain::random_provider::with_rng;

    fn chromosome_with_one_element() -> Chromosome {
        let get = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
        ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            999,
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-6).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-6).unwrap()),
        )
        .genomic_element_types(vec![get])
        .genomic_elements(vec![GenomicElement { start: 100, end: 199, element_type_id: 0 }])
        .build()
        .unwrap()
    }

    #[test]
    fn positions_land_inside_genomic_elements() {
        let chromosome = chromosome_with_one_element();
        let map = chromosome.mutation_rate_map().for_sex(false).clone();
        with_rng(|rng| {
            let positions = draw_mutation_positions(rng, &chromosome, &map, 50);
            assert!(positions.iter().all(|p| (100..=199).contains(p)));
        });
    }

    #[test]
    fn positions_are_sorted_and_deduplicated() {
        let chromosome = chromosome_with_one_element();
        let map = chromosome.mutation_rate_map().for_sex(false).clone();
        with_rng(|rng| {
            let positions = draw_mutation_positions(rng, &chromosome, &map, 30);
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(positions, sorted);
        });
    }

    #[test]
    fn zero_count_yields_no_positions() {
        let chromosome = chromosome_with_one_element();
        let map = chromosome.mutation_rate_map().for_sex(false).clone();
        with_rng(|rng| {
            assert!(draw_mutation_positions(rng, &chromosome, &map, 0).is_empty());
        });
    }
}

use gensim_error::{GensimError, GensimResult};
use hashbrown::HashMap;

use crate::chromosome::Chromosome;
use crate::domain::random_provider::with_rng;
use crate::haplosome::Haplosome;
use crate::mutation::{Mutation, MutationIndex, MutationRegistry, MutationType, Nucleotide};
use crate::run::MutationRun;

use super::breakpoints::{Breakpoint, draw_breakpoints};
use super::events::draw_event_counts;
use super::mutations::draw_mutation_positions;

/// A toggle point: the active parental strand flips at `position` (i.e.
/// positions `< position` use the strand active before the flip,
/// `>= position` use the other one).
#[derive(Clone, Copy, Debug)]
struct Toggle {
    position: i64,
}

fn toggles_from_breakpoints(breakpoints: &[Breakpoint]) -> Vec<Toggle> {
    let mut toggles = Vec::new();
    for bp in breakpoints {
        match bp {
            Breakpoint::Crossover { position } => toggles.push(Toggle { position: *position }),
            Breakpoint::GeneConversion { start, end, .. } => {
                toggles.push(Toggle { position: *start });
                toggles.push(Toggle { position: end + 1 });
            }
        }
    }
    toggles.sort_by_key(|t| t.position);
    toggles
}

/// The result of running crossover-mutation once (spec §4.6).
pub struct CrossoverOutput {
    pub haplosome: Haplosome,
    /// Breakpoints drawn, for the tree-sequence recorder to emit edges
    /// (spec §4.6 step 6, §4.9).
    pub breakpoints: Vec<Breakpoint>,
    /// Newly registered mutations in the order they were drawn, for the
    /// tree-sequence recorder to emit site/mutation rows.
    pub new_mutations: Vec<(MutationIndex, i64)>,
}

/// Produces one child haplosome from two parental haplosomes plus drawn
/// breakpoints and mutations (spec §4.6 "Crossover-mutation").
///
/// `strand1` is the "initial" strand (spec: "strand1 is the initial
/// strand"); copying begins from it and switches to `strand2` at each
/// crossover toggle. `muttypes` resolves a drawn mutation's muttype id to
/// its stacking policy; the caller owns the species' muttype table.
#[allow(clippy::too_many_arguments)]
pub fn crossover_mutation(
    chromosome: &Chromosome,
    strand1: &Haplosome,
    strand2: &Haplosome,
    is_male: bool,
    origin_tick: u32,
    origin_subpop_id: u32,
    registry: &mut MutationRegistry,
    muttypes: &HashMap<u32, MutationType>,
) -> GensimResult<CrossoverOutput> {
    let layout = chromosome.layout();
    let strand1_runs = strand1.mutruns()?;
    let strand2_runs = strand2.mutruns()?;

    if strand1_runs.len() != layout.run_count as usize || strand2_runs.len() != layout.run_count as usize {
        return Err(GensimError::invariant(
            "parental haplosomes do not match the chromosome's current mutrun layout",
        ));
    }

    let mutation_map = chromosome.mutation_rate_map().for_sex(is_male);
    let recomb_map = chromosome.recombination_rate_map().for_sex(is_male);

    let (counts, mut breakpoints, mutation_positions) = with_rng(|rng| {
        let counts = draw_event_counts(rng, mutation_map.overall_rate(), recomb_map.overall_rate());
        let breakpoints = if counts.breakpoint_count > 0 {
            draw_breakpoints(rng, recomb_map, chromosome.dsb(), counts.breakpoint_count, chromosome.last_position())
        } else {
            Vec::new()
        };
        let mutation_positions = if counts.mutation_count > 0 {
            draw_mutation_positions(rng, chromosome, mutation_map, counts.mutation_count)
        } else {
            Vec::new()
        };
        (counts, breakpoints, mutation_positions)
    });
    let _ = counts;
    breakpoints.sort_by_key(|b| b.start());

    // Draw each new mutation's muttype (from the genomic element it lands
    // in) and register it, before assembling runs (spec §4.6 steps 3-4).
    let mut new_mutations: Vec<(MutationIndex, i64)> = Vec::with_capacity(mutation_positions.len());
    for position in &mutation_positions {
        let Some(element) = chromosome.element_at(*position) else {
            // A drawn position that doesn't fall in any genomic element
            // (possible when the rate map extends past the last genomic
            // element) contributes no mutation.
            continue;
        };
        let Some(get) = chromosome.genomic_element_type(element.element_type_id) else {
            continue;
        };

        let u: f64 = with_rng(|rng| rng.random());
        let muttype_id = get.pick_muttype(u * get.total_weight());
        let nucleotide_based = muttypes.get(&muttype_id).map(|mt| mt.nucleotide_based).unwrap_or(false);
        let nucleotide = if nucleotide_based {
            with_rng(|rng| Nucleotide::from_index(rng.range(0u8..4)))
        } else {
            Nucleotide::None
        };

        let mutation = Mutation::new(muttype_id, chromosome.index(), *position, origin_tick, origin_subpop_id, nucleotide);
        let index = registry.register(mutation, 1)?;
        new_mutations.push((index, *position));
    }

    let toggles = toggles_from_breakpoints(&breakpoints);
    let mut child_runs: Vec<MutationRun> = Vec::with_capacity(layout.run_count as usize);
    let mut toggle_cursor = 0usize;
    let mut active_is_strand1 = true;

    for slot in 0..layout.run_count as usize {
        let (slot_start, slot_end) = layout.slot_bounds(slot);

        // Advance the toggle cursor (and active strand) past every toggle
        // at or before slot_start, so `active_is_strand1` reflects the
        // strand in effect when this slot begins.
        while toggle_cursor < toggles.len() && toggles[toggle_cursor].position <= slot_start {
            active_is_strand1 = !active_is_strand1;
            toggle_cursor += 1;
        }

        let local_toggles: Vec<i64> = toggles
            .iter()
            .map(|t| t.position)
            .filter(|&p| p > slot_start && p <= slot_end)
            .collect();

        let local_mutations: Vec<(i64, MutationIndex)> = new_mutations
            .iter()
            .filter(|(_, pos)| *pos >= slot_start && *pos <= slot_end)
            .map(|(idx, pos)| (*pos, *idx))
            .collect();

        if local_toggles.is_empty() && local_mutations.is_empty() {
            let source = if active_is_strand1 { &strand1_runs[slot] } else { &strand2_runs[slot] };
            child_runs.push(source.clone());
            continue;
        }

        let mut segments: Vec<(i64, i64, bool)> = Vec::with_capacity(local_toggles.len() + 1);
        let mut seg_start = slot_start;
        let mut seg_strand1 = active_is_strand1;
        for &toggle_pos in &local_toggles {
            segments.push((seg_start, toggle_pos - 1, seg_strand1));
            seg_start = toggle_pos;
            seg_strand1 = !seg_strand1;
        }
        segments.push((seg_start, slot_end, seg_strand1));

        let built = build_slot_content(registry, &segments, &strand1_runs[slot], &strand2_runs[slot], &local_mutations, muttypes)?;
        child_runs.push(MutationRun::from_sorted(built));
    }

    Ok(CrossoverOutput {
        haplosome: Haplosome::new_populated(chromosome.index(), child_runs),
        breakpoints,
        new_mutations,
    })
}

/// Fills one mutrun slot's content by copying each segment's source strand
/// entries (already position-sorted within the run) and splicing in new
/// mutations at their position, honoring the stacking policy (spec §4.6
/// step 4, §4.8).
fn build_slot_content(
    registry: &MutationRegistry,
    segments: &[(i64, i64, bool)],
    strand1_run: &MutationRun,
    strand2_run: &MutationRun,
    new_mutations: &[(i64, MutationIndex)],
    muttypes: &HashMap<u32, MutationType>,
) -> GensimResult<Vec<MutationIndex>> {
    let mut output: Vec<(i64, MutationIndex)> = Vec::new();
    let mut new_iter = new_mutations.iter().peekable();

    for &(seg_start, seg_end, is_strand1) in segments {
        let source = if is_strand1 { strand1_run } else { strand2_run };

        // All existing entries of `source` whose position falls in this
        // segment, looked up once and kept position-tagged for merging.
        let mut source_entries: Vec<(i64, MutationIndex)> = Vec::new();
        for &idx in source.as_slice() {
            let position = registry.get(idx)?.position;
            if position >= seg_start && position <= seg_end {
                source_entries.push((position, idx));
            }
        }

        let mut source_iter = source_entries.into_iter().peekable();

        loop {
            let next_is_new = match (source_iter.peek(), new_iter.peek()) {
                (Some((sp, _)), Some((np, _))) => {
                    if *np < *sp { Some(true) } else if *sp < *np { Some(false) } else { Some(true) }
                }
                (None, Some((np, _))) if *np >= seg_start && *np <= seg_end => Some(true),
                (Some(_), None) => Some(false),
                _ => None,
            };

            match next_is_new {
                Some(true) => {
                    let &(position, index) = new_iter.peek().unwrap();
                    if position > seg_end {
                        break;
                    }
                    new_iter.next();
                    insert_with_stacking(&mut output, position, index, registry, muttypes)?;
                }
                Some(false) => {
                    let (position, index) = source_iter.next().unwrap();
                    insert_with_stacking(&mut output, position, index, registry, muttypes)?;
                }
                None => break,
            }
        }
    }

    Ok(output.into_iter().map(|(_, idx)| idx).collect())
}

/// Inserts `index` (at `position`) into the position-ordered `output`
/// buffer, honoring its muttype's stacking policy against entries already
/// present at the same position (spec §4.8).
fn insert_with_stacking(
    output: &mut Vec<(i64, MutationIndex)>,
    position: i64,
    index: MutationIndex,
    registry: &MutationRegistry,
    muttypes: &HashMap<u32, MutationType>,
) -> GensimResult<()> {
    let mutation = *registry.get(index)?;
    let Some(muttype) = muttypes.get(&mutation.muttype_id) else {
        output.push((position, index));
        return Ok(());
    };

    let group = muttype.effective_stack_group();
    let policy = muttype.effective_stack_policy();

    let same_position_start = output.partition_point(|(p, _)| *p < position);
    let same_position_end = output.partition_point(|(p, _)| *p <= position);
    let existing_group_members: Vec<usize> = (same_position_start..same_position_end)
        .filter(|&i| {
            registry
                .get(output[i].1)
                .ok()
                .and_then(|m| muttypes.get(&m.muttype_id))
                .map(|mt| mt.effective_stack_group() == group)
                .unwrap_or(false)
        })
        .collect();

    match policy {
        crate::mutation::StackPolicy::Stack => {
            output.insert(same_position_end, (position, index));
        }
        crate::mutation::StackPolicy::KeepFirst => {
            if existing_group_members.is_empty() {
                output.insert(same_position_end, (position, index));
            }
        }
        crate::mutation::StackPolicy::KeepLast => {
            for &i in existing_group_members.iter().rev() {
                output.remove(i);
            }
            let insert_at = output.partition_point(|(p, _)| *p <= position);
            output.insert(insert_at, (position, index));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{ChromosomeBuilder, ChromosomeType, GenomicElement, GenomicElementType, MutationTypeProportion, RateMap, SexSpecificMap};
    use crate::mutation::StackPolicy;

    fn no_event_chromosome() -> Chromosome {
        let get = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
        ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            99,
            SexSpecificMap::Shared(RateMap::uniform(99, 0.0).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(99, 0.0).unwrap()),
        )
        .genomic_element_types(vec![get])
        .genomic_elements(vec![GenomicElement { start: 0, end: 99, element_type_id: 0 }])
        .build()
        .unwrap()
    }

    #[test]
    fn zero_rate_chromosome_shares_parental_run_pointer() {
        let chromosome = no_event_chromosome();
        let run = MutationRun::from_sorted(vec![]);
        let strand1 = Haplosome::new_populated(0, vec![run.clone()]);
        let strand2 = Haplosome::new_populated(0, vec![run]);
        let mut registry = MutationRegistry::new(1);
        let muttypes = HashMap::new();

        let output = crossover_mutation(&chromosome, &strand1, &strand2, false, 0, 0, &mut registry, &muttypes).unwrap();

        assert!(output.breakpoints.is_empty());
        assert!(output.new_mutations.is_empty());
        assert!(output.haplosome.mutruns().unwrap()[0].ptr_eq(strand1.mutruns().unwrap().first().unwrap()));
    }

    #[test]
    fn high_mutation_rate_registers_new_mutations() {
        let get = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 7, weight: 1.0 }]).unwrap();
        let chromosome = ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            999,
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-2).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(999, 0.0).unwrap()),
        )
        .genomic_element_types(vec![get])
        .genomic_elements(vec![GenomicElement { start: 0, end: 999, element_type_id: 0 }])
        .build()
        .unwrap();

        let empty_run = MutationRun::from_sorted(vec![]);
        let strand1 = Haplosome::new_populated(0, vec![empty_run.clone()]);
        let strand2 = Haplosome::new_populated(0, vec![empty_run]);
        let mut registry = MutationRegistry::new(1);
        let mut muttypes = HashMap::new();
        muttypes.insert(7, MutationType::new(7, 0, StackPolicy::Stack));

        let output = crossover_mutation(&chromosome, &strand1, &strand2, false, 0, 0, &mut registry, &muttypes).unwrap();
        assert!(!output.new_mutations.is_empty());

        let child_run = &output.haplosome.mutruns().unwrap()[0];
        assert_eq!(child_run.len(), output.new_mutations.len());

        let positions: Vec<i64> = child_run
            .as_slice()
            .iter()
            .map(|idx| registry.get(*idx).unwrap().position)
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted, "child run must stay sorted by position");
    }

    #[test]
    fn keep_last_policy_collapses_same_position_stack() {
        let get = GenomicElementType::new(
            0,
            vec![MutationTypeProportion { muttype_id: 1, weight: 1.0 }],
        )
        .unwrap();
        let chromosome = ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            99,
            SexSpecificMap::Shared(RateMap::uniform(99, 0.0).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(99, 0.0).unwrap()),
        )
        .genomic_element_types(vec![get])
        .genomic_elements(vec![GenomicElement { start: 0, end: 99, element_type_id: 0 }])
        .build()
        .unwrap();

        let mut registry = MutationRegistry::new(1);
        let a = registry.register(Mutation::new(1, 0, 50, 0, 0, Nucleotide::None), 1).unwrap();

        let mut muttypes = HashMap::new();
        muttypes.insert(1, MutationType::new(1, 0, StackPolicy::KeepLast));

        let existing_run = MutationRun::from_sorted(vec![a]);
        let mut output: Vec<(i64, MutationIndex)> = vec![(50, a)];
        let b = registry
            .get(a)
            .map(|m| Mutation::new(1, 0, m.position, 0, 0, Nucleotide::None))
            .unwrap();
        let mut registry2 = registry;
        let b_index = registry2.register(b, 1).unwrap();

        insert_with_stacking(&mut output, 50, b_index, &registry2, &muttypes).unwrap();
        assert_eq!(output, vec![(50, b_index)]);
        let _ = existing_run;
    }
}

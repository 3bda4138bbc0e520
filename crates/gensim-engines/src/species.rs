use hashbrown::HashMap;

use gensim_core::prelude::random_provider::with_rng;
use gensim_core::prelude::{
    Chromosome, ChromosomeType, MutationIndex, MutationRegistry, MutationType, TreeSequenceRecorder, crossover_mutation,
};
use gensim_core::treeseq::IndividualRow;
use gensim_core::{MutationMetadata, TraitCombination, TuneOutcome};
use gensim_error::{GensimError, GensimResult};

use crate::callbacks::{Callbacks, MutationDecision};
use crate::fitness::trait_value;
use crate::individual::Individual;
use crate::population::Population;
use crate::sex::Sex;

/// A single gamete produced by crossover-mutation, carrying what the
/// tree-sequence recorder needs once the child is fully assembled. Edge
/// attribution is recorded against the contributing parent's own node for
/// this chromosome rather than per-breakpoint segment (spec §4.9's edge-per-
/// breakpoint recording is deferred; see `DESIGN.md`).
struct GameteRecord {
    haplosome: gensim_core::prelude::Haplosome,
    new_mutations: Vec<(MutationIndex, i64)>,
    parent_node: u64,
}

/// Owns everything one species needs across ticks: its chromosome
/// definitions, the shared mutation registry, the mutation-type table, the
/// population of subpopulations, optional tree-sequence recording, and the
/// scripting-style callback lists (spec §3 "Species").
pub struct Species {
    chromosomes: Vec<Chromosome>,
    registry: MutationRegistry,
    muttypes: HashMap<u32, MutationType>,
    trait_combination: TraitCombination,
    population: Population,
    child_generation: HashMap<u32, Vec<Individual>>,
    treeseq: Option<TreeSequenceRecorder>,
    tick: u32,
    next_subpop_id: u32,
    next_pedigree_id: u64,
    callbacks: Callbacks,
}

impl Species {
    pub fn new(chromosomes: Vec<Chromosome>, num_traits: usize, trait_combination: TraitCombination) -> Self {
        Species {
            chromosomes,
            registry: MutationRegistry::new(num_traits.max(1)),
            muttypes: HashMap::new(),
            trait_combination,
            population: Population::new(),
            child_generation: HashMap::new(),
            treeseq: None,
            tick: 0,
            next_subpop_id: 0,
            next_pedigree_id: 0,
            callbacks: Callbacks::new(),
        }
    }

    pub fn enable_tree_sequence(&mut self, simplify_interval: u32, simplification_ratio_target: f64) {
        let recorder = TreeSequenceRecorder::new(self.chromosomes.len(), simplify_interval, simplification_ratio_target);
        self.treeseq = Some(recorder);
    }

    pub fn register_mutation_type(&mut self, muttype: MutationType) {
        self.muttypes.insert(muttype.id, muttype);
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn registry(&self) -> &MutationRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MutationRegistry {
        &mut self.registry
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    pub fn tree_sequence(&self) -> Option<&TreeSequenceRecorder> {
        self.treeseq.as_ref()
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    /// Renders the text population snapshot (spec §6 "Population snapshot,
    /// text form") over this species' current chromosomes, registry, and
    /// population.
    pub fn text_snapshot(&self, header: &str) -> GensimResult<String> {
        crate::io::write_text_snapshot(header, &self.chromosomes, &self.registry, &self.population)
    }

    /// Renders VCF for every live mutation on `chromosome_index` across the
    /// current population (spec §6 "VCF format").
    pub fn vcf(&self, chromosome_index: usize) -> GensimResult<String> {
        let chromosome = self.chromosomes.get(chromosome_index).ok_or_else(|| {
            GensimError::invariant(format!("no chromosome at index {chromosome_index}"))
        })?;
        crate::io::write_vcf(chromosome, chromosome_index, &self.registry, &self.population)
    }

    /// Allocates a fresh subpopulation id and adds it with `size` founder
    /// individuals, each haplosome initialized to an empty (non-null)
    /// mutrun vector for autosomes, or null where the chromosome type and a
    /// drawn founder sex say there should be none.
    pub fn add_subpopulation(
        &mut self,
        name: impl Into<String>,
        size: usize,
        sex_ratio: Option<f64>,
    ) -> GensimResult<u32> {
        let subpop_id = self.next_subpop_id;
        self.next_subpop_id += 1;

        let mut subpop = crate::subpopulation::Subpopulation::new(subpop_id, name);
        if let Some(ratio) = sex_ratio {
            subpop = subpop.with_sex_ratio(ratio);
        }

        if let Some(treeseq) = self.treeseq.as_mut() {
            treeseq.add_population(subpop_id, subpop.name().to_string());
        }

        for _ in 0..size {
            let sex = match sex_ratio {
                None => Sex::Hermaphrodite,
                Some(ratio) => {
                    if with_rng(|rng| rng.random::<f64>()) < ratio {
                        Sex::Male
                    } else {
                        Sex::Female
                    }
                }
            };
            let pedigree_id = self.next_pedigree_id;
            self.next_pedigree_id += 1;

            let mut haplosomes = Vec::with_capacity(self.chromosomes.len() * 2);
            for chromosome in &self.chromosomes {
                let index = chromosome.index();
                if chromosome.chromosome_type().is_haploid() {
                    haplosomes.push(gensim_core::prelude::Haplosome::new_populated(index, vec![gensim_core::MutationRun::empty(); chromosome.layout().run_count as usize]));
                    haplosomes.push(gensim_core::prelude::Haplosome::new_null(index));
                } else if chromosome.chromosome_type() == ChromosomeType::Y && sex != Sex::Male {
                    haplosomes.push(gensim_core::prelude::Haplosome::new_null(index));
                    haplosomes.push(gensim_core::prelude::Haplosome::new_null(index));
                } else {
                    let run_count = chromosome.layout().run_count as usize;
                    haplosomes.push(gensim_core::prelude::Haplosome::new_populated(index, vec![gensim_core::MutationRun::empty(); run_count]));
                    haplosomes.push(gensim_core::prelude::Haplosome::new_populated(index, vec![gensim_core::MutationRun::empty(); run_count]));
                }
            }

            let mut individual = Individual::new(pedigree_id, subpop_id, sex, -1, -1, haplosomes);
            individual.set_fitness(1.0);
            subpop.push(individual);
        }

        self.population.add_subpopulation(subpop);
        Ok(subpop_id)
    }

    /// Runs one full tick of the phase sequence spec §4.10 lays out for the
    /// Wright-Fisher variant: first-event scripts, offspring generation,
    /// early-event scripts, fitness recalculation, generation swap,
    /// late-event scripts, then tick advance with registry garbage
    /// collection and tree-sequence bookkeeping.
    pub fn run_tick(&mut self) -> GensimResult<()> {
        for chromosome in &mut self.chromosomes {
            chromosome.optimizer_mut().begin_tick();
        }

        self.run_event_callbacks(EventPhase::First)?;
        self.generate_offspring()?;
        self.run_event_callbacks(EventPhase::Early)?;
        self.recompute_fitness()?;
        self.swap_generations()?;
        self.run_event_callbacks(EventPhase::Late)?;
        self.advance_tick()?;

        Ok(())
    }

    fn run_event_callbacks(&mut self, phase: EventPhase) -> GensimResult<()> {
        let mut callbacks = match phase {
            EventPhase::First => std::mem::take(&mut self.callbacks.first_event),
            EventPhase::Early => std::mem::take(&mut self.callbacks.early_event),
            EventPhase::Late => std::mem::take(&mut self.callbacks.late_event),
        };
        let mut result = Ok(());
        for callback in callbacks.iter_mut() {
            if let Err(err) = callback(self) {
                result = Err(err);
                break;
            }
        }
        match phase {
            EventPhase::First => self.callbacks.first_event = callbacks,
            EventPhase::Early => self.callbacks.early_event = callbacks,
            EventPhase::Late => self.callbacks.late_event = callbacks,
        }
        result
    }

    fn generate_offspring(&mut self) -> GensimResult<()> {
        let subpop_ids: Vec<u32> = self.population.subpopulations().iter().map(|s| s.id()).collect();

        for subpop_id in subpop_ids {
            let target_size = self.population.get(subpop_id)?.size();
            let mut children = Vec::with_capacity(target_size);
            let max_attempts = target_size.saturating_mul(4).max(8);
            let mut attempts = 0;

            while children.len() < target_size && attempts < max_attempts {
                attempts += 1;
                let (parent_a_idx, parent_b_idx) = self.population.get(subpop_id)?.sample_parent_pair()?;
                let child = self.make_offspring(subpop_id, parent_a_idx, parent_b_idx)?;

                if self.callbacks.has_modify_child_callbacks() && !self.accept_child(&child) {
                    continue;
                }
                children.push(child);
            }

            self.child_generation.insert(subpop_id, children);
        }

        Ok(())
    }

    fn accept_child(&mut self, child: &Individual) -> bool {
        let mut callbacks = std::mem::take(&mut self.callbacks.modify_child);
        let accepted = callbacks.iter_mut().all(|cb| cb(child));
        self.callbacks.modify_child = callbacks;
        accepted
    }

    fn draw_offspring_sex(&self, subpop_id: u32) -> GensimResult<Sex> {
        let subpop = self.population.get(subpop_id)?;
        Ok(match subpop.sex_ratio() {
            None => Sex::Hermaphrodite,
            Some(male_fraction) => {
                if with_rng(|rng| rng.random::<f64>()) < male_fraction {
                    Sex::Male
                } else {
                    Sex::Female
                }
            }
        })
    }

    fn mother_father(&self, subpop_id: u32, parent_a_idx: usize, parent_b_idx: usize) -> GensimResult<(usize, usize)> {
        let subpop = self.population.get(subpop_id)?;
        let a_sex = subpop.individuals()[parent_a_idx].sex();
        let b_sex = subpop.individuals()[parent_b_idx].sex();
        Ok(match (a_sex, b_sex) {
            (_, Sex::Female) if a_sex != Sex::Female => (parent_b_idx, parent_a_idx),
            _ => (parent_a_idx, parent_b_idx),
        })
    }

    fn make_offspring(&mut self, subpop_id: u32, parent_a_idx: usize, parent_b_idx: usize) -> GensimResult<Individual> {
        let child_sex = self.draw_offspring_sex(subpop_id)?;
        let (mother_idx, father_idx) = self.mother_father(subpop_id, parent_a_idx, parent_b_idx)?;
        let is_sexual = self.population.get(subpop_id)?.sex_ratio().is_some();

        let pedigree_id = self.next_pedigree_id;
        self.next_pedigree_id += 1;

        let (mother_pedigree, father_pedigree) = {
            let subpop = self.population.get(subpop_id)?;
            (subpop.individuals()[mother_idx].pedigree_id(), subpop.individuals()[father_idx].pedigree_id())
        };

        let chromosome_count = self.chromosomes.len();
        let mut haplosomes = Vec::with_capacity(chromosome_count * 2);
        let mut mutation_records: Vec<(usize, usize, Vec<(MutationIndex, i64)>, u64)> = Vec::new();

        for chromosome_index in 0..chromosome_count {
            let chromosome_type = self.chromosomes[chromosome_index].chromosome_type();

            let (gamete0, gamete1): (GameteRecord, Option<GameteRecord>) = if !is_sexual || chromosome_type == ChromosomeType::Autosome {
                let g0 = self.draw_gamete(chromosome_index, subpop_id, mother_idx, false)?;
                let g1 = self.draw_gamete(chromosome_index, subpop_id, father_idx, true)?;
                (g0, Some(g1))
            } else {
                match chromosome_type {
                    ChromosomeType::HaploidAutosome | ChromosomeType::Mitochondrial => {
                        let g0 = self.draw_haploid_gamete(chromosome_index, subpop_id, mother_idx, false)?;
                        (g0, None)
                    }
                    ChromosomeType::X => {
                        let g0 = self.draw_gamete(chromosome_index, subpop_id, mother_idx, false)?;
                        let g1 = if child_sex == Sex::Female {
                            Some(self.draw_haploid_gamete(chromosome_index, subpop_id, father_idx, true)?)
                        } else {
                            None
                        };
                        (g0, g1)
                    }
                    ChromosomeType::Y => {
                        if child_sex == Sex::Male {
                            let g0 = self.draw_haploid_gamete(chromosome_index, subpop_id, father_idx, true)?;
                            (g0, None)
                        } else {
                            haplosomes.push(gensim_core::prelude::Haplosome::new_null(chromosome_index as u16));
                            haplosomes.push(gensim_core::prelude::Haplosome::new_null(chromosome_index as u16));
                            continue;
                        }
                    }
                    ChromosomeType::Autosome => unreachable!("handled above"),
                }
            };

            let mut g0 = gamete0;
            if self.callbacks.has_mutation_callbacks() {
                self.apply_mutation_callbacks(&mut g0, chromosome_index)?;
            }
            haplosomes.push(g0.haplosome);
            mutation_records.push((chromosome_index, 0, g0.new_mutations, g0.parent_node));

            match gamete1 {
                Some(mut g1) => {
                    if self.callbacks.has_mutation_callbacks() {
                        self.apply_mutation_callbacks(&mut g1, chromosome_index)?;
                    }
                    mutation_records.push((chromosome_index, 1, g1.new_mutations, g1.parent_node));
                    haplosomes.push(g1.haplosome);
                }
                None => haplosomes.push(gensim_core::prelude::Haplosome::new_null(chromosome_index as u16)),
            }
        }

        let mut child = Individual::new(pedigree_id, subpop_id, child_sex, mother_pedigree as i64, father_pedigree as i64, haplosomes);
        child.set_fitness(1.0);

        self.record_child_tree_sequence(&mut child, subpop_id, mutation_records)?;

        Ok(child)
    }

    /// Produces one recombinant gamete from `parent_idx`'s two haplosome
    /// copies on `chromosome_index` (spec §4.6).
    fn draw_gamete(&mut self, chromosome_index: usize, subpop_id: u32, parent_idx: usize, is_male_for_maps: bool) -> GensimResult<GameteRecord> {
        let subpop = self.population.get(subpop_id)?;
        let parent = &subpop.individuals()[parent_idx];
        let parent_node = parent.nodes().get(chromosome_index).map(|&(a, _)| a).unwrap_or(0);
        let output = crossover_mutation(
            &self.chromosomes[chromosome_index],
            parent.haplosome(chromosome_index, 0)?,
            parent.haplosome(chromosome_index, 1)?,
            is_male_for_maps,
            self.tick,
            subpop_id,
            &mut self.registry,
            &self.muttypes,
        )?;
        Ok(GameteRecord { haplosome: output.haplosome, new_mutations: output.new_mutations, parent_node })
    }

    /// Produces a non-recombining gamete from `parent_idx`'s single haploid
    /// copy on `chromosome_index` (e.g. maternal mitochondrial transmission,
    /// paternal Y transmission) — crossover-mutation still runs to draw new
    /// mutations, but with both strands pointing at the same haplosome so no
    /// recombination is visible.
    fn draw_haploid_gamete(&mut self, chromosome_index: usize, subpop_id: u32, parent_idx: usize, is_male_for_maps: bool) -> GensimResult<GameteRecord> {
        let subpop = self.population.get(subpop_id)?;
        let parent = &subpop.individuals()[parent_idx];
        let parent_node = parent.nodes().get(chromosome_index).map(|&(a, _)| a).unwrap_or(0);
        let strand = parent.haplosome(chromosome_index, 0)?;
        let output = crossover_mutation(
            &self.chromosomes[chromosome_index],
            strand,
            strand,
            is_male_for_maps,
            self.tick,
            subpop_id,
            &mut self.registry,
            &self.muttypes,
        )?;
        Ok(GameteRecord { haplosome: output.haplosome, new_mutations: output.new_mutations, parent_node })
    }

    /// Applies registered mutation callbacks to every freshly drawn mutation
    /// in `output`, editing the child haplosome's mutrun in place for a
    /// reject (drop it) or rewrite (splice in the replacement) decision
    /// (spec §4.6 step 4, §11).
    fn apply_mutation_callbacks(&mut self, output: &mut GameteRecord, chromosome_index: usize) -> GensimResult<()> {
        if output.new_mutations.is_empty() {
            return Ok(());
        }

        let mut callbacks = std::mem::take(&mut self.callbacks.mutation);
        let mut retained = Vec::with_capacity(output.new_mutations.len());

        for (index, position) in output.new_mutations.drain(..) {
            let mutation = *self.registry.get(index)?;
            let mut decision = MutationDecision::Accept;
            for callback in callbacks.iter_mut() {
                decision = callback(&mutation);
                if !matches!(decision, MutationDecision::Accept) {
                    break;
                }
            }

            match decision {
                MutationDecision::Accept => retained.push((index, position)),
                MutationDecision::Reject => {
                    self.remove_mutation_from_run(&mut output.haplosome, chromosome_index, index)?;
                    self.registry.add_reference(index, -1)?;
                }
                MutationDecision::Rewrite(new_mutation) => {
                    let new_index = self.registry.register(new_mutation, 1)?;
                    self.replace_mutation_in_run(&mut output.haplosome, chromosome_index, index, new_index)?;
                    self.registry.add_reference(index, -1)?;
                    retained.push((new_index, position));
                }
            }
        }

        output.new_mutations = retained;
        self.callbacks.mutation = callbacks;
        Ok(())
    }

    fn remove_mutation_from_run(&self, haplosome: &mut gensim_core::prelude::Haplosome, chromosome_index: usize, index: MutationIndex) -> GensimResult<()> {
        let position = self.registry.get(index)?.position;
        let slot = self.chromosomes[chromosome_index].layout().mutrun_index_for(position);
        let run = haplosome
            .mutruns_mut()?
            .get_mut(slot)
            .ok_or_else(|| GensimError::invariant(format!("no mutrun slot {slot} on child haplosome")))?;
        let list = run.make_mut();
        if let Some(pos) = list.iter().position(|m| *m == index) {
            list.remove(pos);
        }
        Ok(())
    }

    fn replace_mutation_in_run(
        &self,
        haplosome: &mut gensim_core::prelude::Haplosome,
        chromosome_index: usize,
        old_index: MutationIndex,
        new_index: MutationIndex,
    ) -> GensimResult<()> {
        let position = self.registry.get(old_index)?.position;
        let slot = self.chromosomes[chromosome_index].layout().mutrun_index_for(position);
        let run = haplosome
            .mutruns_mut()?
            .get_mut(slot)
            .ok_or_else(|| GensimError::invariant(format!("no mutrun slot {slot} on child haplosome")))?;
        let list = run.make_mut();
        if let Some(pos) = list.iter().position(|m| *m == old_index) {
            list[pos] = new_index;
        }
        Ok(())
    }

    fn record_child_tree_sequence(
        &mut self,
        child: &mut Individual,
        subpop_id: u32,
        mutation_records: Vec<(usize, usize, Vec<(MutationIndex, i64)>, u64)>,
    ) -> GensimResult<()> {
        if self.treeseq.is_none() {
            return Ok(());
        }

        let row = IndividualRow {
            pedigree_id: child.pedigree_id() as i64,
            parent1_pedigree_id: child.parent1_pedigree_id(),
            parent2_pedigree_id: child.parent2_pedigree_id(),
            age: child.age(),
            subpop_id,
            sex: child.sex() as u32,
            flags: 0,
        };
        let individual_row_id = self.treeseq.as_mut().unwrap().add_individual(row);

        let mut per_chromosome: HashMap<usize, Vec<(usize, Vec<(MutationIndex, i64)>, u64)>> = HashMap::new();
        for (chromosome_index, copy, new_mutations, parent_node) in mutation_records {
            per_chromosome.entry(chromosome_index).or_default().push((copy, new_mutations, parent_node));
        }

        for (chromosome_index, entries) in per_chromosome {
            let treeseq = self.treeseq.as_mut().unwrap();
            let (node0, node1) = treeseq.record_offspring_nodes(self.tick as f64, individual_row_id, true);
            child.set_nodes(chromosome_index, (node0, node1));

            let last_position = self.chromosomes[chromosome_index].last_position();
            for (copy, new_mutations, parent_node) in entries {
                let child_node = if copy == 0 { node0 } else { node1 };
                let treeseq = self.treeseq.as_mut().unwrap();
                treeseq.record_edge(chromosome_index, 0, last_position, parent_node, child_node)?;
                for (index, position) in new_mutations {
                    let mutation = *self.registry.get(index)?;
                    let metadata = MutationMetadata {
                        muttype_id: mutation.muttype_id,
                        effect: self.registry.traits().get(0, index).effect,
                        origin_subpop_id: mutation.origin_subpop_id,
                        origin_tick: mutation.origin_tick,
                        nucleotide: mutation.nucleotide,
                    };
                    let treeseq = self.treeseq.as_mut().unwrap();
                    treeseq.record_new_mutation(chromosome_index, position, child_node, vec![mutation.id], metadata)?;
                }
            }
        }

        Ok(())
    }

    fn recompute_fitness(&mut self) -> GensimResult<()> {
        let subpop_ids: Vec<u32> = self.child_generation.keys().copied().collect();
        for subpop_id in subpop_ids {
            let mut children = self.child_generation.remove(&subpop_id).unwrap_or_default();
            for child in children.iter_mut() {
                let fitness = self.individual_fitness(child)?;
                child.set_fitness(fitness);
            }
            self.child_generation.insert(subpop_id, children);
        }
        Ok(())
    }

    fn individual_fitness(&self, individual: &Individual) -> GensimResult<f64> {
        let chromosome_count = individual.haplosomes().len() / 2;
        let mut fitness = 1.0;
        for chromosome_index in 0..chromosome_count {
            let a = individual.haplosome(chromosome_index, 0)?;
            let b = individual.haplosome(chromosome_index, 1)?;
            if !a.is_populated() || !b.is_populated() {
                continue;
            }
            let raw = trait_value(&self.registry, 0, self.trait_combination, a, b)?;
            let factor = match self.trait_combination {
                TraitCombination::Additive => (1.0 + raw).max(0.0),
                TraitCombination::Multiplicative => raw.max(0.0),
            };
            fitness *= factor;
        }
        Ok(fitness)
    }

    fn swap_generations(&mut self) -> GensimResult<()> {
        let subpop_ids: Vec<u32> = self.population.subpopulations().iter().map(|s| s.id()).collect();
        for subpop_id in subpop_ids {
            if let Some(children) = self.child_generation.remove(&subpop_id) {
                self.population.get_mut(subpop_id)?.set_individuals(children);
            }
        }
        Ok(())
    }

    fn advance_tick(&mut self) -> GensimResult<()> {
        self.tick += 1;
        self.tally_refcounts();

        let total_haplosome_count = (self.population.total_size() as u32).saturating_mul(2);
        self.registry.sweep(total_haplosome_count, self.tick)?;

        for chromosome in &mut self.chromosomes {
            if let TuneOutcome::Transitioned { new_count } = chromosome.optimizer_mut().end_tick() {
                tracing::info!(new_count, chromosome = chromosome.symbol(), "mutrun count transitioned");
            }
        }

        self.maybe_simplify()?;
        Ok(())
    }

    fn tally_refcounts(&mut self) {
        self.registry.zero_refcounts();
        for subpop in self.population.subpopulations() {
            for individual in subpop.individuals() {
                for haplosome in individual.haplosomes() {
                    if !haplosome.is_populated() {
                        continue;
                    }
                    if let Ok(runs) = haplosome.mutruns() {
                        for run in runs {
                            for &index in run.as_slice() {
                                self.registry.bump_reference(index);
                            }
                        }
                    }
                }
            }
        }
    }

    fn maybe_simplify(&mut self) -> GensimResult<()> {
        if self.treeseq.is_none() {
            return Ok(());
        }

        for chromosome_index in 0..self.chromosomes.len() {
            let treeseq = self.treeseq.as_mut().unwrap();
            treeseq.accumulate_simplify_clock(chromosome_index, 1)?;
            if !treeseq.due_for_simplify(chromosome_index)? {
                continue;
            }

            let samples: Vec<u64> = self
                .population
                .subpopulations()
                .iter()
                .flat_map(|s| s.individuals())
                .filter_map(|individual| individual.nodes().get(chromosome_index))
                .flat_map(|&(a, b)| [a, b])
                .collect();

            self.treeseq.as_mut().unwrap().simplify_chromosome(chromosome_index, &samples)?;
        }

        Ok(())
    }
}

enum EventPhase {
    First,
    Early,
    Late,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gensim_core::prelude::{ChromosomeBuilder, GenomicElement, GenomicElementType, MutationTypeProportion, RateMap, SexSpecificMap};

    fn single_autosome_species() -> Species {
        let get = GenomicElementType::new(0, vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }]).unwrap();
        let chromosome = ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            999,
            SexSpecificMap::Shared(RateMap::uniform(999, 0.0).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(999, 0.0).unwrap()),
        )
        .genomic_element_types(vec![get])
        .genomic_elements(vec![GenomicElement { start: 0, end: 999, element_type_id: 0 }])
        .build()
        .unwrap();

        Species::new(vec![chromosome], 1, TraitCombination::Additive)
    }

    #[test]
    fn hermaphroditic_tick_preserves_subpopulation_size() {
        let mut species = single_autosome_species();
        let subpop_id = species.add_subpopulation("p0", 10, None).unwrap();
        species.run_tick().unwrap();
        assert_eq!(species.population().get(subpop_id).unwrap().size(), 10);
        assert_eq!(species.tick(), 1);
    }

    #[test]
    fn sexual_model_assigns_every_chromosome_a_haplosome_slot() {
        let mut species = single_autosome_species();
        species.add_subpopulation("p0", 6, Some(0.5)).unwrap();
        species.run_tick().unwrap();
        let subpop = species.population().get(0).unwrap();
        for individual in subpop.individuals() {
            assert_eq!(individual.haplosomes().len(), 2);
        }
    }
}

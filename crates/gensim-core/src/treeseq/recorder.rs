use gensim_error::{GensimError, GensimResult};
use tracing::debug;

use super::metadata::MutationMetadata;
use super::simplify::{has_coalesced, simplify};
use super::tables::{EdgeTable, IndividualRow, IndividualTable, MutationTable, NodeTable, PopulationTable, SiteTable};

/// Per-chromosome table collection plus the auto-simplification bookkeeping
/// fields (spec §4.9). Node/individual/population tables are not
/// duplicated here; they live once on [`TreeSequenceRecorder`] and are
/// shared by every chromosome's edges/sites/mutations.
pub struct ChromosomeTables {
    pub edges: EdgeTable,
    pub sites: SiteTable,
    pub mutations: MutationTable,
    simplify_elapsed: u32,
    simplify_interval: u32,
    simplification_ratio_target: f64,
    coalesced: Option<bool>,
}

impl ChromosomeTables {
    fn new(simplify_interval: u32, simplification_ratio_target: f64) -> Self {
        ChromosomeTables {
            edges: EdgeTable::new(),
            sites: SiteTable::new(),
            mutations: MutationTable::new(),
            simplify_elapsed: 0,
            simplify_interval,
            simplification_ratio_target,
            coalesced: None,
        }
    }

    pub fn coalesced(&self) -> Option<bool> {
        self.coalesced
    }

    fn due_for_simplify(&self) -> bool {
        self.simplify_elapsed >= self.simplify_interval
    }
}

/// Owns the tree-sequence state for an entire species: the tables shared
/// across chromosomes, one [`ChromosomeTables`] per chromosome, and the
/// remembered-node set simplification must never drop (spec §4.9).
pub struct TreeSequenceRecorder {
    nodes: NodeTable,
    individuals: IndividualTable,
    populations: PopulationTable,
    chromosomes: Vec<ChromosomeTables>,
    remembered_nodes: Vec<u64>,
    crosscheck_interval: Option<u32>,
    ticks_since_crosscheck: u32,
}

impl TreeSequenceRecorder {
    pub fn new(chromosome_count: usize, simplify_interval: u32, simplification_ratio_target: f64) -> Self {
        TreeSequenceRecorder {
            nodes: NodeTable::new(),
            individuals: IndividualTable::new(),
            populations: PopulationTable::new(),
            chromosomes: (0..chromosome_count)
                .map(|_| ChromosomeTables::new(simplify_interval, simplification_ratio_target))
                .collect(),
            remembered_nodes: Vec::new(),
            crosscheck_interval: None,
            ticks_since_crosscheck: 0,
        }
    }

    pub fn set_crosscheck_interval(&mut self, interval: Option<u32>) {
        self.crosscheck_interval = interval;
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn individuals(&self) -> &IndividualTable {
        &self.individuals
    }

    pub fn populations(&self) -> &PopulationTable {
        &self.populations
    }

    pub fn chromosome(&self, index: usize) -> GensimResult<&ChromosomeTables> {
        self.chromosomes
            .get(index)
            .ok_or_else(|| GensimError::invariant(format!("no tree-sequence tables for chromosome {index}")))
    }

    pub fn remember_node(&mut self, node: u64) {
        if !self.remembered_nodes.contains(&node) {
            self.remembered_nodes.push(node);
        }
    }

    pub fn add_population(&mut self, subpop_id: u32, name: impl Into<String>) -> u64 {
        self.populations.add_population(subpop_id, name)
    }

    pub fn add_individual(&mut self, row: IndividualRow) -> u64 {
        self.individuals.add_individual(row)
    }

    /// Allocates the pair of node rows for one individual's haplosome copies
    /// on one chromosome (spec §4.9: "two nodes per chromosome per
    /// individual, invariant").
    pub fn record_offspring_nodes(&mut self, time: f64, individual: u64, is_sample: bool) -> (u64, u64) {
        let a = self.nodes.add_node(time, individual as i64, is_sample);
        let b = self.nodes.add_node(time, individual as i64, is_sample);
        (a, b)
    }

    pub fn record_edge(&mut self, chromosome_index: usize, left: i64, right: i64, parent_node: u64, child_node: u64) -> GensimResult<()> {
        let tables = self.chromosome_mut(chromosome_index)?;
        tables.edges.add_edge(left, right, parent_node, child_node);
        Ok(())
    }

    /// Appends a site (if this position is new on this chromosome) and a
    /// mutation row for a newly drawn mutation (spec §4.9 step from §4.6
    /// step 6).
    pub fn record_new_mutation(
        &mut self,
        chromosome_index: usize,
        position: i64,
        node: u64,
        derived_state: Vec<u64>,
        metadata: MutationMetadata,
    ) -> GensimResult<u64> {
        let ancestral_state = metadata.nucleotide.as_signed_byte();
        let tables = self.chromosome_mut(chromosome_index)?;
        let site = tables.sites.find_or_insert(position, ancestral_state);
        Ok(tables.mutations.add_mutation(site, node, derived_state, metadata))
    }

    /// `record_new_derived_state`: writes a fresh mutation row reflecting the
    /// full ordered set of mutation ids now present at `position` on `node`
    /// (spec §4.9), used after a bulk operation or stacking-policy eviction
    /// changes what is present at a site without a single new mutation
    /// being drawn.
    pub fn record_new_derived_state(
        &mut self,
        chromosome_index: usize,
        position: i64,
        node: u64,
        derived_state: Vec<u64>,
        metadata: MutationMetadata,
    ) -> GensimResult<u64> {
        self.record_new_mutation(chromosome_index, position, node, derived_state, metadata)
    }

    pub fn accumulate_simplify_clock(&mut self, chromosome_index: usize, ticks: u32) -> GensimResult<()> {
        self.chromosome_mut(chromosome_index)?.simplify_elapsed += ticks;
        Ok(())
    }

    pub fn due_for_simplify(&self, chromosome_index: usize) -> GensimResult<bool> {
        Ok(self.chromosome(chromosome_index)?.due_for_simplify())
    }

    /// Runs simplify for one chromosome using `samples` (the currently-alive
    /// individuals' nodes plus remembered nodes), and adjusts the next
    /// simplify interval toward `simplification_ratio_target` (spec §4.9
    /// "adjust the next interval so the predicted next pre/post ratio
    /// approaches the target").
    pub fn simplify_chromosome(&mut self, chromosome_index: usize, alive_sample_nodes: &[u64]) -> GensimResult<()> {
        let mut samples: Vec<u64> = alive_sample_nodes.to_vec();
        samples.extend(self.remembered_nodes.iter().copied());
        samples.sort_unstable();
        samples.dedup();

        if chromosome_index >= self.chromosomes.len() {
            return Err(GensimError::invariant(format!("no tree-sequence tables for chromosome {chromosome_index}")));
        }

        // Accessed as disjoint struct fields (not through `chromosome_mut`,
        // which borrows all of `self`) so `self.nodes` and
        // `self.chromosomes[..]` can be read together here.
        let pre_size = self.chromosomes[chromosome_index].edges.len().max(1);
        let result = simplify(&self.nodes, &self.chromosomes[chromosome_index].edges, &samples);
        let post_size = result.edges.len();
        let coalesced = has_coalesced(&result.edges, result.nodes.len());

        let tables = &mut self.chromosomes[chromosome_index];
        tables.edges = result.edges;
        tables.coalesced = Some(coalesced);
        tables.simplify_elapsed = 0;

        let observed_ratio = post_size as f64 / pre_size as f64;
        if observed_ratio > 0.0 {
            let adjustment = tables.simplification_ratio_target / observed_ratio;
            let new_interval = (tables.simplify_interval as f64 * adjustment).round().clamp(1.0, 1_000_000.0) as u32;
            debug!(chromosome_index, pre_size, post_size, new_interval, "simplified tree-sequence tables");
            tables.simplify_interval = new_interval;
        }

        self.nodes = result.nodes;
        Ok(())
    }

    pub fn crosscheck_due(&mut self) -> bool {
        let Some(interval) = self.crosscheck_interval else { return false };
        self.ticks_since_crosscheck += 1;
        if self.ticks_since_crosscheck >= interval {
            self.ticks_since_crosscheck = 0;
            true
        } else {
            false
        }
    }

    fn chromosome_mut(&mut self, index: usize) -> GensimResult<&mut ChromosomeTables> {
        self.chromosomes
            .get_mut(index)
            .ok_or_else(|| GensimError::invariant(format!("no tree-sequence tables for chromosome {index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::Nucleotide;

    fn sample_metadata() -> MutationMetadata {
        MutationMetadata { muttype_id: 0, effect: 0.0, origin_subpop_id: 0, origin_tick: 0, nucleotide: Nucleotide::None }
    }

    #[test]
    fn offspring_nodes_come_in_pairs() {
        let mut rec = TreeSequenceRecorder::new(1, 10, 0.5);
        let (a, b) = rec.record_offspring_nodes(1.0, 0, true);
        assert_ne!(a, b);
        assert_eq!(rec.nodes().len(), 2);
    }

    #[test]
    fn new_mutation_reuses_site_at_same_position() {
        let mut rec = TreeSequenceRecorder::new(1, 10, 0.5);
        let (node, _) = rec.record_offspring_nodes(0.0, 0, true);
        rec.record_new_mutation(0, 500, node, vec![1], sample_metadata()).unwrap();
        rec.record_new_mutation(0, 500, node, vec![1, 2], sample_metadata()).unwrap();
        assert_eq!(rec.chromosome(0).unwrap().sites.len(), 1);
        assert_eq!(rec.chromosome(0).unwrap().mutations.len(), 2);
    }

    #[test]
    fn simplify_resets_elapsed_clock_and_sets_coalescence() {
        let mut rec = TreeSequenceRecorder::new(1, 5, 0.5);
        let (root, _) = rec.record_offspring_nodes(0.0, 0, false);
        let (child, _) = rec.record_offspring_nodes(1.0, 1, true);
        rec.record_edge(0, 0, 100, root, child).unwrap();
        rec.accumulate_simplify_clock(0, 10).unwrap();
        assert!(rec.due_for_simplify(0).unwrap());

        rec.simplify_chromosome(0, &[child]).unwrap();
        assert!(!rec.due_for_simplify(0).unwrap());
        assert_eq!(rec.chromosome(0).unwrap().coalesced(), Some(true));
    }
}

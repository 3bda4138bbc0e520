use gensim_error::{GensimError, GensimResult};

use super::dsb::DsbParams;
use super::genomic_element::{GenomicElement, GenomicElementType, validate_elements};
use super::layout::MutrunLayout;
use super::optimizer::MutationRunOptimizer;
use super::pools::ChromosomePools;
use super::rate_map::SexSpecificMap;

/// What kind of chromosome copy this is (spec §3 "Chromosome": "named,
/// typed (autosome / X / Y / mitochondrial / haploid-autosome / etc.)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromosomeType {
    Autosome,
    X,
    Y,
    Mitochondrial,
    HaploidAutosome,
}

impl ChromosomeType {
    /// Whether a haplosome of this type is ploidy-1 (only one copy ever
    /// carried, regardless of the individual's sex), used by the species
    /// coordinator's fixation-threshold computation (spec §11 "Mutation
    /// state transitions").
    pub fn is_haploid(&self) -> bool {
        matches!(self, ChromosomeType::Y | ChromosomeType::Mitochondrial | ChromosomeType::HaploidAutosome)
    }
}

/// A named, typed, indexed chromosome definition (spec §3 "Chromosome").
/// Owns its rate maps, genomic element layout, mutrun layout/optimizer, and
/// per-chromosome object pools; individual [`crate::haplosome::Haplosome`]s
/// reference it only by `index` (spec §9: "arena-owned objects... raw
/// non-owning pointers inside the graph").
pub struct Chromosome {
    index: u16,
    symbol: String,
    chromosome_type: ChromosomeType,
    first_position: i64,
    last_position: i64,

    mutation_rate_map: SexSpecificMap,
    recombination_rate_map: SexSpecificMap,

    genomic_element_types: Vec<GenomicElementType>,
    genomic_elements: Vec<GenomicElement>,

    dsb: DsbParams,
    layout: MutrunLayout,
    optimizer: MutationRunOptimizer,
    pools: ChromosomePools,
}

pub struct ChromosomeBuilder {
    index: u16,
    symbol: String,
    chromosome_type: ChromosomeType,
    first_position: i64,
    last_position: i64,
    mutation_rate_map: SexSpecificMap,
    recombination_rate_map: SexSpecificMap,
    genomic_element_types: Vec<GenomicElementType>,
    genomic_elements: Vec<GenomicElement>,
    dsb: DsbParams,
    mutrun_base_count: u32,
    mutrun_multiplier: u32,
    thread_count: usize,
}

impl ChromosomeBuilder {
    pub fn new(
        index: u16,
        symbol: impl Into<String>,
        chromosome_type: ChromosomeType,
        last_position: i64,
        mutation_rate_map: SexSpecificMap,
        recombination_rate_map: SexSpecificMap,
    ) -> Self {
        ChromosomeBuilder {
            index,
            symbol: symbol.into(),
            chromosome_type,
            first_position: 0,
            last_position,
            mutation_rate_map,
            recombination_rate_map,
            genomic_element_types: Vec::new(),
            genomic_elements: Vec::new(),
            dsb: DsbParams::disabled(),
            mutrun_base_count: 1,
            mutrun_multiplier: 1,
            thread_count: 1,
        }
    }

    pub fn genomic_element_types(mut self, types: Vec<GenomicElementType>) -> Self {
        self.genomic_element_types = types;
        self
    }

    pub fn genomic_elements(mut self, elements: Vec<GenomicElement>) -> Self {
        self.genomic_elements = elements;
        self
    }

    pub fn dsb(mut self, dsb: DsbParams) -> Self {
        self.dsb = dsb;
        self
    }

    pub fn mutrun_layout(mut self, base_count: u32, multiplier: u32) -> Self {
        self.mutrun_base_count = base_count;
        self.mutrun_multiplier = multiplier;
        self
    }

    pub fn thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn build(self) -> GensimResult<Chromosome> {
        validate_elements(&self.genomic_elements)?;
        for element in &self.genomic_elements {
            if !self.genomic_element_types.iter().any(|t| t.id == element.element_type_id) {
                return Err(GensimError::config(format!(
                    "genomic element references unknown genomic element type {}",
                    element.element_type_id
                )));
            }
            if element.start < self.first_position || element.end > self.last_position {
                return Err(GensimError::config(format!(
                    "genomic element [{}, {}] lies outside chromosome bounds [{}, {}]",
                    element.start, element.end, self.first_position, self.last_position
                )));
            }
        }

        let layout = MutrunLayout::new(self.last_position, self.mutrun_base_count, self.mutrun_multiplier)?;

        Ok(Chromosome {
            index: self.index,
            symbol: self.symbol,
            chromosome_type: self.chromosome_type,
            first_position: self.first_position,
            last_position: self.last_position,
            mutation_rate_map: self.mutation_rate_map,
            recombination_rate_map: self.recombination_rate_map,
            genomic_element_types: self.genomic_element_types,
            genomic_elements: self.genomic_elements,
            dsb: self.dsb,
            layout,
            optimizer: MutationRunOptimizer::new(self.mutrun_base_count),
            pools: ChromosomePools::new(self.thread_count),
        })
    }
}

impl Chromosome {
    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn chromosome_type(&self) -> ChromosomeType {
        self.chromosome_type
    }

    pub fn first_position(&self) -> i64 {
        self.first_position
    }

    pub fn last_position(&self) -> i64 {
        self.last_position
    }

    pub fn mutation_rate_map(&self) -> &SexSpecificMap {
        &self.mutation_rate_map
    }

    pub fn recombination_rate_map(&self) -> &SexSpecificMap {
        &self.recombination_rate_map
    }

    pub fn dsb(&self) -> &DsbParams {
        &self.dsb
    }

    pub fn layout(&self) -> MutrunLayout {
        self.layout
    }

    pub fn optimizer(&self) -> &MutationRunOptimizer {
        &self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut MutationRunOptimizer {
        &mut self.optimizer
    }

    pub fn pools(&mut self) -> &mut ChromosomePools {
        &mut self.pools
    }

    pub fn genomic_elements(&self) -> &[GenomicElement] {
        &self.genomic_elements
    }

    pub fn genomic_element_type(&self, id: u32) -> Option<&GenomicElementType> {
        self.genomic_element_types.iter().find(|t| t.id == id)
    }

    /// Finds the genomic element (if any) containing `position`, used by
    /// crossover-mutation's new-mutation muttype draw (spec §4.6 step 3).
    pub fn element_at(&self, position: i64) -> Option<&GenomicElement> {
        // Elements are sorted and non-overlapping (validated at build time),
        // so a linear scan with early exit is fine for the modest element
        // counts real models use; a binary search would need a separate
        // sorted-starts index for negligible benefit here.
        self.genomic_elements.iter().find(|e| e.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::genomic_element::MutationTypeProportion;
    use crate::chromosome::rate_map::RateMap;

    fn simple_chromosome() -> Chromosome {
        let get = GenomicElementType::new(
            0,
            vec![MutationTypeProportion { muttype_id: 0, weight: 1.0 }],
        )
        .unwrap();

        ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            999,
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-7).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-8).unwrap()),
        )
        .genomic_element_types(vec![get])
        .genomic_elements(vec![GenomicElement { start: 0, end: 999, element_type_id: 0 }])
        .build()
        .unwrap()
    }

    #[test]
    fn builds_with_valid_configuration() {
        let chromosome = simple_chromosome();
        assert_eq!(chromosome.last_position(), 999);
        assert_eq!(chromosome.layout().run_count, 1);
    }

    #[test]
    fn element_referencing_unknown_type_is_rejected() {
        let result = ChromosomeBuilder::new(
            0,
            "I",
            ChromosomeType::Autosome,
            999,
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-7).unwrap()),
            SexSpecificMap::Shared(RateMap::uniform(999, 1e-8).unwrap()),
        )
        .genomic_elements(vec![GenomicElement { start: 0, end: 999, element_type_id: 5 }])
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn element_at_finds_containing_element() {
        let chromosome = simple_chromosome();
        assert!(chromosome.element_at(500).is_some());
    }

    #[test]
    fn haploid_types_are_flagged() {
        assert!(ChromosomeType::Y.is_haploid());
        assert!(!ChromosomeType::Autosome.is_haploid());
    }
}

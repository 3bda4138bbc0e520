pub mod chromosome;
pub mod crossover;
pub mod domain;
pub mod haplosome;
pub mod mutation;
pub mod run;
pub mod treeseq;

pub use chromosome::{
    Chromosome, ChromosomeBuilder, ChromosomePools, ChromosomeType, DsbParams, GenomicElement, GenomicElementType,
    MutationRunOptimizer, MutationTypeProportion, MutrunLayout, RateMap, SexSpecificMap, TuneOutcome,
};
pub use crossover::{Breakpoint, CrossoverOutput, EventCounts, crossover_mutation, draw_breakpoints, draw_event_counts, draw_mutation_positions};
pub use haplosome::{Haplosome, HaplosomePool, HaplosomeWalker};
pub use mutation::{
    Mutation, MutationBlock, MutationIndex, MutationRegistry, MutationState, MutationType, Nucleotide,
    NucleotideFormat, NucleotideOutput, StackGroup, StackPolicy, Substitution, SubstitutionList, SweepReport,
    TraitCombination, TraitInfo, TraitTable, MUTATION_BLOCK_HARD_CEILING, MUTATION_INDEX_NONE, random_nucleotides,
};
pub use run::{BulkRunCache, MutationRun, RunBufferPool};
pub use treeseq::{
    ChromosomeTables, HaplosomeNodeMetadata, IndividualMetadata, MutationMetadata, TreeSequenceRecorder,
};

/// Convenience re-export surface for downstream crates (`gensim-engines`,
/// `gensim`), mirroring the shape of this crate's own top-level exports so
/// callers can `use gensim_core::prelude::*` instead of naming every
/// submodule.
pub mod prelude {
    pub use super::chromosome::{
        Chromosome, ChromosomeBuilder, ChromosomeType, DsbParams, GenomicElement, GenomicElementType,
        MutationTypeProportion, MutrunLayout, RateMap, SexSpecificMap,
    };
    pub use super::crossover::{Breakpoint, CrossoverOutput, crossover_mutation};
    pub use super::domain::random_provider;
    pub use super::domain::{ThreadPool, WaitGroup};
    pub use super::haplosome::{Haplosome, HaplosomeWalker};
    pub use super::mutation::{
        Mutation, MutationIndex, MutationRegistry, MutationType, Nucleotide, NucleotideFormat, NucleotideOutput,
        StackGroup, StackPolicy, random_nucleotides,
    };
    pub use super::run::MutationRun;
    pub use super::treeseq::TreeSequenceRecorder;
}

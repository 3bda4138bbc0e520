pub mod block;
pub mod nucleotide_gen;
pub mod registry;
pub mod substitution;
pub mod trait_table;
pub mod types;

pub use block::MutationBlock;
pub use nucleotide_gen::{NucleotideFormat, NucleotideOutput, random_nucleotides};
pub use registry::{MutationRegistry, SweepReport};
pub use substitution::{Substitution, SubstitutionList};
pub use trait_table::TraitTable;
pub use types::{
    Mutation, MutationIndex, MutationState, MutationType, Nucleotide, StackGroup, StackPolicy,
    TraitCombination, TraitInfo, MUTATION_BLOCK_HARD_CEILING, MUTATION_INDEX_NONE,
};

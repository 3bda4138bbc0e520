pub mod metadata;
pub mod recorder;
pub mod simplify;
pub mod tables;

pub use metadata::{HaplosomeNodeMetadata, IndividualMetadata, MutationMetadata, INDIVIDUAL_METADATA_LEN, MUTATION_METADATA_LEN};
pub use recorder::{ChromosomeTables, TreeSequenceRecorder};
pub use simplify::{SimplifyResult, has_coalesced, simplify};
pub use tables::{
    EdgeRow, EdgeTable, IndividualRow, IndividualTable, MutationRow, MutationTable, NodeRow, NodeTable, PopulationRow,
    PopulationTable, NODE_IS_SAMPLE,
};

pub mod chromosome;
pub mod dsb;
pub mod genomic_element;
pub mod layout;
pub mod optimizer;
pub mod pools;
pub mod rate_map;

pub use chromosome::{Chromosome, ChromosomeBuilder, ChromosomeType};
pub use dsb::DsbParams;
pub use genomic_element::{GenomicElement, GenomicElementType, MutationTypeProportion};
pub use layout::MutrunLayout;
pub use optimizer::{MutationRunOptimizer, TuneOutcome};
pub use pools::ChromosomePools;
pub use rate_map::{RateMap, SexSpecificMap};

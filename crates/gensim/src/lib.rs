//! A forward-time, individual-based population genetics simulation engine.
//!
//! This crate re-exports the genetic-state engine (`gensim-core`: mutations,
//! haplosomes, chromosomes, crossover-mutation, tree-sequence recording) and
//! the species coordinator (`gensim-engines`: populations, subpopulations,
//! individuals, the per-tick Wright-Fisher pipeline) as one flat surface, the
//! way an embedding application is expected to consume the engine.

pub use gensim_core::prelude::*;
pub use gensim_engines::prelude::*;
pub use gensim_error::{ErrString, GensimError, GensimResult};

//! Species coordinator and per-tick phase pipeline for the gensim
//! population-genetics simulator: the mutable simulation state
//! (`Species`, `Population`, `Subpopulation`, `Individual`) and the
//! Wright-Fisher tick loop that drives it, built on top of the arena-owned
//! chromosome/mutation/haplosome types in `gensim-core`.

mod callbacks;
mod fitness;
mod individual;
pub mod io;
mod pipeline;
mod population;
mod sex;
mod species;
mod subpopulation;
mod wheel;

pub use callbacks::{Callbacks, EventCallback, ModifyChildCallback, MutationCallback, MutationDecision};
pub use individual::Individual;
pub use pipeline::{Pipeline, TickStep};
pub use population::Population;
pub use sex::Sex;
pub use species::Species;
pub use subpopulation::Subpopulation;

/// Convenience re-export surface for downstream crates (`gensim`), mirroring
/// the shape of `gensim-core`'s own `prelude` module.
pub mod prelude {
    pub use super::callbacks::{Callbacks, EventCallback, ModifyChildCallback, MutationCallback, MutationDecision};
    pub use super::individual::Individual;
    pub use super::io::{write_ms, write_text_snapshot, write_vcf};
    pub use super::pipeline::{Pipeline, TickStep};
    pub use super::population::Population;
    pub use super::sex::Sex;
    pub use super::species::Species;
    pub use super::subpopulation::Subpopulation;
}

pub mod haplosome;
pub mod pool;
pub mod walker;

pub use haplosome::Haplosome;
pub use pool::HaplosomePool;
pub use walker::HaplosomeWalker;

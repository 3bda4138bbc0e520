pub mod bulk;
pub mod mutation_run;
pub mod pool;

pub use bulk::BulkRunCache;
pub use mutation_run::MutationRun;
pub use pool::RunBufferPool;

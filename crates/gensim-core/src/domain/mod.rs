pub mod random_provider;
pub mod thread_pool;

pub use thread_pool::{ThreadPool, WaitGroup, get_thread_pool};

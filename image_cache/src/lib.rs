mod cache;
pub mod config;
pub mod memory_cache;
pub mod traits;

pub use cache::{CacheMode, SharedCache};

//! Cache Module
//!
//! Provides the byte-bounded LRU eviction cache and its thread-safe wrapper.

mod lru;
mod stats;
mod store;
mod view;


// Re-export public types
pub use lru::{LruCache, OnEvicted, Value};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use view::ByteView;

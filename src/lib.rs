//! Peer Cache - a node of a distributed in-memory key/value cache
//!
//! Each node holds byte-bounded LRU caches grouped by name and fetches keys
//! it does not own from the owning peer over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{get_group, new_group, Group};

//! Peers Module
//!
//! Contracts for routing a key to the node that owns it and for fetching
//! from that node, plus the HTTP implementation of both.
//!
//! # Components
//! - [`PeerPicker`]: key -> owning peer, or `None` when this node owns it
//! - [`PeerGetter`]: fetch `{group, key}` from one remote node
//! - [`HashRing`]: consistent hashing used by [`HttpPool`]

mod http;
mod ring;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FetchRequest, FetchResponse};

pub use http::{HttpGetter, HttpPool};
pub use ring::HashRing;

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the remote owner of `key`, or `None` to serve it locally.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches values from one remote node.
///
/// Implementations neither retry nor cache; both belong to the caller.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

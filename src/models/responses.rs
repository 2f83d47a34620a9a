//! Response DTOs for peer lookups and operational endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use bytes::Bytes;
use serde::Serialize;

use crate::cache::CacheStats;

/// Value returned by a peer for a [`FetchRequest`](super::FetchRequest).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// Raw cached bytes, untouched by the transport
    pub value: Bytes,
}

impl FetchResponse {
    /// Creates a new FetchResponse
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// The group the statistics belong to
    pub group: String,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Bytes held by resident keys and values
    pub used_bytes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(group: impl Into<String>, stats: &CacheStats) -> Self {
        Self {
            group: group.into(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            used_bytes: stats.used_bytes,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Address of the node answering
    pub node: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(node: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            node: node.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

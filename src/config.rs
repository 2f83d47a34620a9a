//! Configuration Module
//!
//! Handles loading and validating node configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default request namespace served to peers.
pub const DEFAULT_BASE_PATH: &str = "/_gocache/";

/// Default number of virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// This node's address as peers reach it, e.g. `http://10.0.0.1:8001`
    pub self_addr: String,
    /// HTTP server port
    pub server_port: u16,
    /// Request namespace under which peers fetch keys
    pub base_path: String,
    /// Byte budget of the group cache (0 = unbounded)
    pub cache_bytes: u64,
    /// Name of the group served by this node
    pub group_name: String,
    /// Directory backing the group on cache misses
    pub data_dir: PathBuf,
    /// Addresses of all nodes in the cluster, this one included
    pub peers: Vec<String>,
    /// Per-request timeout for peer fetches in milliseconds (0 = none)
    pub peer_timeout_ms: u64,
    /// Virtual nodes per peer on the hash ring
    pub ring_replicas: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SELF_ADDR` - This node's peer address (default: http://127.0.0.1:8001)
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `BASE_PATH` - Peer request namespace (default: /_gocache/)
    /// - `CACHE_BYTES` - Cache byte budget (default: 64 MiB)
    /// - `GROUP_NAME` - Served group (default: scores)
    /// - `DATA_DIR` - Source directory for misses (default: ./data)
    /// - `PEERS` - Comma separated peer addresses (default: SELF_ADDR)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout (default: 2000)
    /// - `RING_REPLICAS` - Virtual nodes per peer (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let self_addr = env::var("SELF_ADDR").unwrap_or(defaults.self_addr);
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            peer_timeout_ms: parse_var("PEER_TIMEOUT_MS").unwrap_or(defaults.peer_timeout_ms),
            ring_replicas: parse_var("RING_REPLICAS").unwrap_or(defaults.ring_replicas),
            self_addr,
            peers,
        }
    }

    /// Checks the configuration before the server starts accepting requests.
    pub fn validate(&self) -> Result<()> {
        validate_base_path(&self.base_path)?;
        if self.self_addr.is_empty() {
            return Err(CacheError::Config("SELF_ADDR must not be empty".into()));
        }
        if self.group_name.is_empty() {
            return Err(CacheError::Config("GROUP_NAME must not be empty".into()));
        }
        if self.ring_replicas == 0 {
            return Err(CacheError::Config("RING_REPLICAS must be at least 1".into()));
        }
        Ok(())
    }

    /// Peer fetch timeout, `None` when disabled.
    pub fn peer_timeout(&self) -> Option<Duration> {
        (self.peer_timeout_ms > 0).then(|| Duration::from_millis(self.peer_timeout_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_addr = "http://127.0.0.1:8001".to_string();
        Self {
            peers: vec![self_addr.clone()],
            self_addr,
            server_port: 8001,
            base_path: DEFAULT_BASE_PATH.to_string(),
            cache_bytes: 64 << 20,
            group_name: "scores".to_string(),
            data_dir: PathBuf::from("./data"),
            peer_timeout_ms: 2000,
            ring_replicas: DEFAULT_REPLICAS,
        }
    }
}

/// Rejects namespaces that the router cannot mount as `<base>*path`.
///
/// A node must never serve requests outside its namespace, so a bad value
/// is a startup error rather than a per-request one.
pub fn validate_base_path(base_path: &str) -> Result<()> {
    let valid = base_path.len() > 2
        && base_path.starts_with('/')
        && base_path.ends_with('/')
        && !base_path.contains("//")
        && !base_path.contains(['*', ':', '{', '}']);
    if valid {
        Ok(())
    } else {
        Err(CacheError::Config(format!(
            "base path must look like /<namespace>/, got {:?}",
            base_path
        )))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_peers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

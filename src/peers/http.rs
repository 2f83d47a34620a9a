//! HTTP peer pool and peer client.
//!
//! [`HttpPool`] is this node's view of the cluster: it owns the hash ring
//! and one [`HttpGetter`] per remote node. Peers are reached at
//! `<peer><base_path><group>/<key>`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Url};
use tracing::{debug, info};

use super::{HashRing, PeerGetter, PeerPicker};
use crate::config::{validate_base_path, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
use crate::error::{CacheError, Result};
use crate::models::{FetchRequest, FetchResponse};

// == HTTP Getter ==
/// Client for one remote node's peer endpoint.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base: Url,
    client: Client,
}

impl HttpGetter {
    /// Creates a getter for `base_url`, e.g. `http://10.0.0.2:8001/_gocache/`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a getter sharing an existing HTTP client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| CacheError::Config(format!("invalid peer url {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(CacheError::Config(format!(
                "peer url {} cannot carry a path",
                base_url
            )));
        }
        Ok(Self { base, client })
    }

    /// Builds the request URL; group and key are percent-encoded as single
    /// path segments.
    fn url_for(&self, request: &FetchRequest) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CacheError::TransportFailure(format!("bad peer url {}", self.base)))?
            .pop_if_empty()
            .push(&request.group)
            .push(&request.key);
        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let url = self.url_for(request)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CacheError::TransportFailure(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CacheError::RemoteFailure {
                status: status.as_u16(),
                message: message.trim_end().to_string(),
            });
        }

        let value = response
            .bytes()
            .await
            .map_err(|e| CacheError::TransportFailure(format!("reading body of {}: {}", url, e)))?;

        Ok(FetchResponse::new(value))
    }
}

// == HTTP Pool ==
/// Picks peers over a consistent hash ring and reaches them over HTTP.
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: Client,
    state: RwLock<PoolState>,
}

struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

impl HttpPool {
    /// Creates a pool for the node reachable at `self_addr` with default options.
    pub fn new(self_addr: &str) -> Result<Self> {
        Self::with_options(self_addr, DEFAULT_BASE_PATH, DEFAULT_REPLICAS, None)
    }

    /// Creates a pool with an explicit namespace, ring size and peer timeout.
    pub fn with_options(
        self_addr: &str,
        base_path: &str,
        replicas: usize,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        validate_base_path(base_path)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CacheError::Config(format!("building peer client: {}", e)))?;

        Ok(Self {
            self_addr: normalize(self_addr),
            base_path: base_path.to_string(),
            replicas,
            client,
            state: RwLock::new(PoolState {
                ring: HashRing::new(replicas),
                getters: HashMap::new(),
            }),
        })
    }

    /// Replaces the cluster membership. `peers` should include this node.
    pub fn set_peers<I, S>(&self, peers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| normalize(p.as_ref())).collect();

        let mut ring = HashRing::new(self.replicas);
        ring.add(&peers);

        let mut getters = HashMap::with_capacity(peers.len());
        for peer in &peers {
            let base_url = format!("{}{}", peer, self.base_path);
            let getter = HttpGetter::with_client(&base_url, self.client.clone())?;
            getters.insert(peer.clone(), Arc::new(getter));
        }

        *self.state.write() = PoolState { ring, getters };
        info!("[Server {}] peers set: {:?}", self.self_addr, peers);
        Ok(())
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }
        debug!("[Server {}] pick peer {} for {}", self.self_addr, peer, key);
        let getter = state.getters.get(peer)?;
        Some(Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

fn normalize(addr: &str) -> String {
    addr.trim().trim_end_matches('/').to_string()
}

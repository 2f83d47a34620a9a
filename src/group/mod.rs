//! Group Module
//!
//! A group is a named cache namespace: a byte-bounded [`CacheStore`], a
//! [`Getter`] that loads from the source of truth on a miss, and optionally
//! a [`PeerPicker`] that routes keys owned by other nodes.
//!
//! Groups are published in a [`Registry`] so the peer endpoint can resolve
//! them by name.

mod source;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, CacheStore};
use crate::error::{CacheError, Result};
use crate::models::FetchRequest;
use crate::peers::{PeerGetter, PeerPicker};

pub use source::DirectoryGetter;

// == Getter ==
/// Loads the value of a key from the source of truth.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Bytes>;
}

/// Adapts a synchronous closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> Result<Bytes> + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Bytes> {
        (self.0)(key)
    }
}

// == Group ==
/// Named cache namespace backed by a local cache, peers and a loader.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .finish_non_exhaustive()
    }
}

impl Group {
    /// Creates a group whose local cache holds at most `cache_bytes`.
    pub fn new(name: impl Into<String>, cache_bytes: u64, getter: impl Getter + 'static) -> Self {
        Self {
            name: name.into(),
            getter: Arc::new(getter),
            main_cache: CacheStore::new(cache_bytes),
            peers: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs the peer picker. Peers can only be registered once.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(picker).map_err(|_| {
            CacheError::Config(format!("peers already registered for group {}", self.name))
        })
    }

    // == Get ==
    /// Returns the value of `key`, from memory, its owning peer or the getter.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::BadRequest("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key) {
            debug!("[{}] cache hit for {}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(err) => warn!("[{}] failed to get {} from peer: {}", self.name, key, err),
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let response = peer.get(&FetchRequest::new(&self.name, key)).await?;
        Ok(ByteView::from(response.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let value = ByteView::from(self.getter.get(key).await?);
        self.main_cache.add(key, value.clone());
        Ok(value)
    }

    /// Statistics of the local cache.
    pub fn stats(&self) -> CacheStats {
        self.main_cache.stats()
    }
}

// == Registry ==
/// Name to group mapping shared by the whole process.
#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `group`, replacing any group of the same name.
    pub fn register(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        self.groups
            .write()
            .insert(group.name().to_string(), Arc::clone(&group));
        group
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

/// The process-wide registry.
pub fn global() -> Arc<Registry> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(Registry::new())))
}

/// Creates a group and publishes it in the process-wide registry.
pub fn new_group(
    name: impl Into<String>,
    cache_bytes: u64,
    getter: impl Getter + 'static,
) -> Arc<Group> {
    global().register(Group::new(name, cache_bytes, getter))
}

/// Looks up a group in the process-wide registry.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    global().lookup(name)
}

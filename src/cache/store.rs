//! Cache Store Module
//!
//! Lock-guarded wrapper around [`LruCache`] shared by every request task.

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruCache, OnEvicted, Value};

// == Cache Store ==
/// Thread-safe byte-bounded LRU cache with hit/miss statistics.
///
/// Every operation takes the same mutex for the duration of an in-memory
/// mutation only. The recency list and its index are never handed out, so
/// they always agree on the resident key set.
pub struct CacheStore<V = ByteView> {
    inner: Mutex<Inner<V>>,
}

struct Inner<V> {
    lru: LruCache<V>,
    stats: CacheStats,
}

impl<V> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl<V: Value + Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store holding at most `max_bytes` of keys and values.
    ///
    /// A budget of 0 disables eviction entirely.
    pub fn new(max_bytes: u64) -> Self {
        Self::from_lru(LruCache::new(max_bytes))
    }

    /// Creates a store that reports evicted entries to `on_evicted`.
    ///
    /// The callback runs while the store lock is held and must not call
    /// back into the same store.
    pub fn with_on_evicted(max_bytes: u64, on_evicted: OnEvicted<V>) -> Self {
        Self::from_lru(LruCache::with_on_evicted(max_bytes, on_evicted))
    }

    fn from_lru(lru: LruCache<V>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lru,
                stats: CacheStats::new(),
            }),
        }
    }

    // == Add ==
    /// Inserts or replaces `key`, evicting the oldest entries if needed.
    pub fn add(&self, key: impl Into<String>, value: V) {
        let mut inner = self.inner.lock();
        let evicted = inner.lru.add(key, value);
        inner.stats.record_evictions(evicted);
    }

    // == Get ==
    /// Returns a clone of the cached value, promoting it on a hit.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let value = inner.lru.get(key).cloned();
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry. No-op on an empty store.
    pub fn remove_oldest(&self) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.lru.remove_oldest();
        if removed {
            inner.stats.record_evictions(1);
        }
        removed
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Bytes currently accounted to resident keys and values.
    pub fn used_bytes(&self) -> u64 {
        self.inner.lock().lru.used_bytes()
    }

    /// Configured byte budget, 0 if unbounded.
    pub fn max_bytes(&self) -> u64 {
        self.inner.lock().lru.max_bytes()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.lru.len();
        stats.used_bytes = inner.lru.used_bytes();
        stats
    }
}

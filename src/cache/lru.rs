//! LRU Cache Module
//!
//! Byte-bounded least-recently-used cache. Entries live in an index-linked
//! arena so lookup, insert and promote-to-front are all O(1) on average.
//!
//! This type is not synchronized; see [`CacheStore`](super::CacheStore) for
//! the lock-guarded wrapper shared between request handlers.

use std::collections::HashMap;

use bytes::Bytes;

/// Null link in the recency list.
const NIL: usize = usize::MAX;

// == Value ==
/// Any value that can report how many bytes it occupies.
///
/// The cache never inspects the content, only this length.
pub trait Value {
    /// Size of the value in bytes.
    fn len(&self) -> usize;
}

impl Value for String {
    fn len(&self) -> usize {
        String::len(self)
    }
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Value for Bytes {
    fn len(&self) -> usize {
        Bytes::len(self)
    }
}

/// Callback fired with the key and value of every evicted entry.
pub type OnEvicted<V> = Box<dyn FnMut(String, V) + Send>;

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

// == LRU Cache ==
/// Capacity-bounded key/value store ordered by recency of access.
///
/// - `head` = most recently used
/// - `tail` = least recently used
///
/// `used_bytes` is always the sum of `key.len() + value.len()` over resident
/// entries. A `max_bytes` of 0 means unbounded.
pub struct LruCache<V> {
    max_bytes: u64,
    used_bytes: u64,
    index: HashMap<String, usize>,
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V> std::fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .finish()
    }
}

impl<V: Value> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports every eviction to `on_evicted`.
    pub fn with_on_evicted(max_bytes: u64, on_evicted: OnEvicted<V>) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(on_evicted);
        cache
    }

    // == Add ==
    /// Inserts or replaces the value under `key` and marks it most recently used.
    ///
    /// Afterwards the oldest entries are evicted until the byte budget holds
    /// again. A single entry larger than the whole budget stays resident on
    /// its own. Returns the number of evicted entries.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> usize {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            self.unlink(idx);
            self.push_front(idx);
            let node = self.node_mut(idx);
            let old_len = node.value.len() as u64;
            let new_len = value.len() as u64;
            node.value = value;
            self.used_bytes = self.used_bytes - old_len + new_len;
        } else {
            self.used_bytes += (key.len() + value.len()) as u64;
            let node = Node {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            };
            let idx = match self.free.pop() {
                Some(idx) => {
                    self.slots[idx] = Some(node);
                    idx
                }
                None => {
                    self.slots.push(Some(node));
                    self.slots.len() - 1
                }
            };
            self.push_front(idx);
            self.index.insert(key, idx);
        }

        let mut evicted = 0;
        while self.max_bytes != 0 && self.used_bytes > self.max_bytes && self.index.len() > 1 {
            self.remove_oldest();
            evicted += 1;
        }
        evicted
    }

    // == Get ==
    /// Looks up `key`, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.unlink(idx);
        self.push_front(idx);
        Some(&self.node(idx).value)
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, if any.
    ///
    /// The eviction callback runs after the entry is unlinked and its bytes
    /// released. Returns `false` on an empty cache.
    pub fn remove_oldest(&mut self) -> bool {
        let idx = self.tail;
        if idx == NIL {
            return false;
        }
        self.unlink(idx);
        let Some(node) = self.slots[idx].take() else {
            return false;
        };
        self.free.push(idx);
        self.index.remove(&node.key);
        self.used_bytes -= (node.key.len() + node.value.len()) as u64;

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(node.key, node.value);
        }
        true
    }

    // == Length ==
    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently accounted to resident entries.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Configured byte budget, 0 if unbounded.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Resident keys from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut idx = self.head;
        while idx != NIL {
            let node = self.node(idx);
            keys.push(node.key.as_str());
            idx = node.next;
        }
        keys
    }

    // == List Plumbing ==
    fn node(&self, idx: usize) -> &Node<V> {
        self.slots[idx]
            .as_ref()
            .expect("linked slot must be occupied")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<V> {
        self.slots[idx]
            .as_mut()
            .expect("linked slot must be occupied")
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.node_mut(prev).next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.node_mut(next).prev = prev;
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head == NIL {
            self.tail = idx;
        } else {
            self.node_mut(old_head).prev = idx;
        }
        self.head = idx;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<(String, String)>>>, OnEvicted<String>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let callback: OnEvicted<String> = Box::new(move |key: String, value: String| {
            sink.lock().unwrap().push((key, value));
        });
        (log, callback)
    }

    #[test]
    fn test_lru_new() {
        let lru: LruCache<String> = LruCache::new(0);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_get_hit_and_miss() {
        let mut lru = LruCache::new(0);
        lru.add("key1", "1234".to_string());

        assert_eq!(lru.get("key1"), Some(&"1234".to_string()));
        assert_eq!(lru.get("key2"), None);
    }

    #[test]
    fn test_add_accounts_key_and_value_bytes() {
        let mut lru = LruCache::new(0);
        lru.add("k1", "value1".to_string());
        lru.add("k22", "v".to_string());

        assert_eq!(lru.used_bytes(), (2 + 6) + (3 + 1));
    }

    #[test]
    fn test_readd_updates_value_and_bytes() {
        let mut lru = LruCache::new(0);
        lru.add("key", "short".to_string());
        lru.add("key", "much longer".to_string());

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.used_bytes(), 3 + 11);
        assert_eq!(lru.get("key"), Some(&"much longer".to_string()));

        lru.add("key", "x".to_string());
        assert_eq!(lru.used_bytes(), 3 + 1);
    }

    #[test]
    fn test_readd_promotes_to_front() {
        let mut lru = LruCache::new(0);
        lru.add("a", "1".to_string());
        lru.add("b", "2".to_string());
        lru.add("c", "3".to_string());
        lru.add("a", "4".to_string());

        assert_eq!(lru.keys(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_remove_oldest() {
        let k1 = "key1";
        let k2 = "key2";
        let k3 = "k3";
        let v1 = "value1".to_string();
        let v2 = "value2".to_string();
        let v3 = "v3".to_string();
        let cap = (k1.len() + k2.len() + v1.len() + v2.len()) as u64;

        let mut lru = LruCache::new(cap);
        lru.add(k1, v1);
        lru.add(k2, v2);
        lru.add(k3, v3);

        assert!(lru.get("key1").is_none());
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_eviction_callback_order() {
        let (log, callback) = recorder();
        let mut lru = LruCache::with_on_evicted(10, callback);

        lru.add("key1", "123456".to_string());
        lru.add("k2", "k2".to_string());
        lru.add("k3", "k3".to_string());
        lru.add("k4", "k4".to_string());

        let evicted = log.lock().unwrap().clone();
        assert_eq!(
            evicted,
            vec![
                ("key1".to_string(), "123456".to_string()),
                ("k2".to_string(), "k2".to_string()),
            ]
        );
        assert_eq!(lru.keys(), vec!["k4", "k3"]);
    }

    #[test]
    fn test_get_changes_eviction_order() {
        let mut lru = LruCache::new(6);
        lru.add("a", "1".to_string());
        lru.add("b", "2".to_string());
        lru.add("c", "3".to_string());

        lru.get("a");
        lru.add("d", "4".to_string());

        assert!(lru.get("b").is_none());
        assert!(lru.get("a").is_some());
    }

    #[test]
    fn test_miss_has_no_side_effect() {
        let (log, callback) = recorder();
        let mut lru = LruCache::with_on_evicted(100, callback);
        lru.add("a", "1".to_string());
        let before = lru.used_bytes();

        assert!(lru.get("missing").is_none());
        assert_eq!(lru.used_bytes(), before);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_oldest_on_empty_is_noop() {
        let (log, callback) = recorder();
        let mut lru = LruCache::with_on_evicted(10, callback);

        assert!(!lru.remove_oldest());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_oversized_entry_stays_alone() {
        let mut lru = LruCache::new(8);
        lru.add("a", "1".to_string());
        lru.add("b", "2".to_string());
        lru.add("big", "0123456789".to_string());

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.keys(), vec!["big"]);
        assert_eq!(lru.used_bytes(), 13);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut lru = LruCache::new(0);
        for i in 0..1000 {
            lru.add(format!("key{}", i), "x".repeat(100));
        }
        assert_eq!(lru.len(), 1000);
    }

    #[test]
    fn test_slots_are_reused_after_eviction() {
        let mut lru = LruCache::new(4);
        for i in 0..50 {
            lru.add(format!("k{}", i % 10), "v".to_string());
        }
        assert!(lru.slots.len() <= 3);
        assert_eq!(lru.keys().len(), lru.len());
    }

    #[test]
    fn test_eviction_releases_entry_before_callback_returns() {
        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let mut lru: LruCache<String> = LruCache::with_on_evicted(
            4,
            Box::new(move |key: String, _: String| sink.lock().unwrap().push(key)),
        );
        lru.add("a", "1".to_string());
        lru.add("b", "2".to_string());
        lru.add("c", "3".to_string());

        assert_eq!(*observed.lock().unwrap(), vec!["a".to_string()]);
        assert!(lru.get("a").is_none());
        assert_eq!(lru.used_bytes(), 4);
    }
}

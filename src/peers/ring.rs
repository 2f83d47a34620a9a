//! Consistent hash ring mapping keys to peers.

use std::collections::HashMap;

use xxhash_rust::xxh3::xxh3_64;

// == Hash Ring ==
/// Consistent hash ring with `replicas` virtual nodes per peer.
///
/// Adding or removing a peer only moves the keys adjacent to its virtual
/// nodes.
#[derive(Debug, Clone)]
pub struct HashRing {
    replicas: usize,
    /// Sorted virtual node hashes
    points: Vec<u64>,
    owners: HashMap<u64, String>,
}

impl HashRing {
    /// Creates an empty ring. `replicas` is clamped to at least 1.
    pub fn new(replicas: usize) -> Self {
        Self {
            replicas: replicas.max(1),
            points: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Adds peers to the ring.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let point = xxh3_64(format!("{}{}", i, peer).as_bytes());
                self.owners.insert(point, peer.to_string());
                self.points.push(point);
            }
        }
        self.points.sort_unstable();
        self.points.dedup();
    }

    /// Returns the peer owning `key`, or `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let hash = xxh3_64(key.as_bytes());
        let idx = self.points.partition_point(|&p| p < hash) % self.points.len();
        self.owners.get(&self.points[idx]).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(3);
        assert!(ring.is_empty());
        assert_eq!(ring.get("Tom"), None);
    }

    #[test]
    fn test_single_peer_owns_everything() {
        let mut ring = HashRing::new(3);
        ring.add(["http://a:1"]);
        for key in ["Tom", "Jack", "Sam", ""] {
            assert_eq!(ring.get(key), Some("http://a:1"));
        }
    }

    #[test]
    fn test_lookup_is_stable() {
        let mut ring = HashRing::new(50);
        ring.add(["http://a:1", "http://b:2", "http://c:3"]);
        for i in 0..100 {
            let key = format!("key{}", i);
            assert_eq!(ring.get(&key), ring.get(&key));
        }
    }

    #[test]
    fn test_adding_peer_moves_only_some_keys() {
        let mut ring = HashRing::new(50);
        ring.add(["http://a:1", "http://b:2"]);
        let before: Vec<String> = (0..500)
            .map(|i| ring.get(&format!("key{}", i)).unwrap().to_string())
            .collect();

        ring.add(["http://c:3"]);
        let mut moved = 0;
        for (i, owner) in before.iter().enumerate() {
            let now = ring.get(&format!("key{}", i)).unwrap();
            if now != owner {
                assert_eq!(now, "http://c:3", "keys only move to the new peer");
                moved += 1;
            }
        }
        assert!(moved > 0 && moved < 500);
    }

    #[test]
    fn test_all_peers_receive_keys() {
        let mut ring = HashRing::new(50);
        let peers = ["http://a:1", "http://b:2", "http://c:3"];
        ring.add(peers);
        for peer in peers {
            let owned = (0..1000)
                .filter(|i| ring.get(&format!("key{}", i)) == Some(peer))
                .count();
            assert!(owned > 0, "{} owns no keys", peer);
        }
    }
}

use std::collections::HashMap;

/// Hash function used to place both virtual nodes and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// CRC-32 (IEEE), the default ring hash.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Consistent hash ring with `replicas` virtual nodes per real node.
///
/// Each node `n` is placed at `hash("{i}{n}")` for `i` in `0..replicas`. A key is owned by
/// the first virtual node clockwise from `hash(key)`, wrapping past the largest position.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    keys: Vec<u32>,
    owners: HashMap<u32, String>,
    nodes: Vec<String>,
}

impl HashRing {
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, crc32_ieee)
    }

    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            keys: Vec::new(),
            owners: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Places every node on the ring and re-sorts the virtual keys.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            if self.nodes.iter().any(|n| n == node) {
                continue;
            }
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, node).as_bytes());
                self.keys.push(hash);
                self.owners.insert(hash, node.to_string());
            }
            self.nodes.push(node.to_string());
        }
        self.keys.sort_unstable();
    }

    /// Rebuilds the ring from the surviving nodes. Returns `false` if `node` was unknown.
    pub fn remove(&mut self, node: &str) -> bool {
        if !self.nodes.iter().any(|n| n == node) {
            return false;
        }
        let survivors: Vec<String> = self.nodes.iter().filter(|n| *n != node).cloned().collect();
        let mut rebuilt = HashRing::with_hasher(self.replicas, self.hash);
        rebuilt.add(&survivors);
        *self = rebuilt;
        true
    }

    /// Returns the node owning `key`, or `None` when the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);
        let vkey = self.keys[idx % self.keys.len()];
        self.owners.get(&vkey).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of virtual keys on the ring.
    pub fn virtual_len(&self) -> usize {
        self.keys.len()
    }
}

//! Node Configuration
//!
//! The recognized options of a cache node: per-group byte capacity, ring replica count,
//! peer base path, the static peer list and the peer fetch timeout/retry policy.

use std::time::Duration;

/// Default byte budget of a group's local store (2 KiB).
pub const DEFAULT_CACHE_BYTES: usize = 2 << 10;
/// Virtual nodes per real peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;
/// Path prefix under which a node answers its peers.
pub const DEFAULT_BASE_PATH: &str = "/_gencache/";
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_FETCH_ATTEMPTS: usize = 1;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Byte budget for each group's store. `0` means unbounded.
    pub cache_bytes: usize,
    pub replicas: usize,
    pub base_path: String,
    pub peer_timeout: Duration,
    /// Attempts per peer fetch. Values above 1 retry with exponential backoff.
    pub fetch_attempts: usize,
    /// This node's own address as it appears in `peers`, e.g. `http://localhost:8001`.
    pub self_addr: String,
    pub peers: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_bytes: DEFAULT_CACHE_BYTES,
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            peer_timeout: DEFAULT_PEER_TIMEOUT,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            self_addr: String::new(),
            peers: Vec::new(),
        }
    }
}

impl CacheConfig {
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self {
            self_addr: self_addr.into(),
            ..Self::default()
        }
    }

    pub fn with_cache_bytes(mut self, cache_bytes: usize) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    /// A replica count of zero falls back to the default.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = if replicas == 0 {
            DEFAULT_REPLICAS
        } else {
            replicas
        };
        self
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    pub fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = timeout;
        self
    }

    pub fn with_fetch_attempts(mut self, attempts: usize) -> Self {
        self.fetch_attempts = attempts.max(1);
        self
    }

    pub fn with_peers<I, S>(mut self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peers = peers.into_iter().map(Into::into).collect();
        self
    }
}

/// Ensures a leading `/` and exactly one trailing `/`. Empty input yields the default.
pub fn normalize_base_path(base_path: &str) -> String {
    let cleaned = base_path.trim_matches('/');
    if cleaned.is_empty() {
        return DEFAULT_BASE_PATH.to_string();
    }
    format!("/{}/", cleaned)
}

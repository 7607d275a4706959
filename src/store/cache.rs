//! Group Store
//!
//! `Store` guards one byte-budgeted LRU of `ByteView`s behind a mutex and reports its
//! occupancy as `StoreStats`.

use parking_lot::Mutex;
use serde::Serialize;

use super::byteview::ByteView;
use super::lru::LruCache;

/// Point-in-time view of a store's occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub bytes: usize,
    pub items: usize,
    pub evictions: u64,
}

/// Thread-safe byte-budgeted store used as a group's local cache.
///
/// Every operation, including `get`, takes the same mutex because a hit reorders the
/// recency list. The LRU is allocated lazily on the first `add`.
pub struct Store {
    cache_bytes: usize,
    lru: Mutex<Option<LruCache<ByteView>>>,
}

impl Store {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            lru: Mutex::new(None),
        }
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.lru.lock();
        guard
            .get_or_insert_with(|| LruCache::new(self.cache_bytes))
            .add(key, value);
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lru.lock();
        guard.as_mut()?.get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut guard = self.lru.lock();
        guard.as_mut().map(|lru| lru.remove(key)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lru.lock().as_ref().map(LruCache::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache_bytes
    }

    pub fn stats(&self) -> StoreStats {
        match self.lru.lock().as_ref() {
            Some(lru) => StoreStats {
                bytes: lru.used_bytes(),
                items: lru.len(),
                evictions: lru.evictions(),
            },
            None => StoreStats::default(),
        }
    }
}

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::StoreStats;

/// Loads the value for a key from the backing data source when no cache has it.
///
/// Implemented by the embedding application, once per group.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts an async closure into a [`Loader`].
///
/// ```ignore
/// let loader = LoaderFn(|key: String| async move { anyhow::Ok(key.into_bytes()) });
/// ```
pub struct LoaderFn<F>(pub F);

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
{
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key.to_string()).await
    }
}

/// Live counters of one group.
#[derive(Debug, Default)]
pub struct Stats {
    /// Every `get`, hits included.
    pub gets: AtomicU64,
    pub cache_hits: AtomicU64,
    /// Values successfully fetched from a peer.
    pub peer_loads: AtomicU64,
    pub peer_errors: AtomicU64,
    /// Cache misses that went through the single-flight call.
    pub loads: AtomicU64,
    /// Misses answered by another caller's in-flight load.
    pub loads_deduped: AtomicU64,
    pub local_loads: AtomicU64,
    pub local_load_errs: AtomicU64,
    /// Requests that arrived from peers.
    pub server_requests: AtomicU64,
}

impl Stats {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Serializable snapshot of a group's counters and store occupancy.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupStats {
    pub name: String,
    pub gets: u64,
    pub cache_hits: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub loads: u64,
    pub loads_deduped: u64,
    pub local_loads: u64,
    pub local_load_errs: u64,
    pub server_requests: u64,
    pub store: StoreStats,
}

impl GroupStats {
    pub(crate) fn snapshot(name: &str, stats: &Stats, store: StoreStats) -> Self {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        Self {
            name: name.to_string(),
            gets: load(&stats.gets),
            cache_hits: load(&stats.cache_hits),
            peer_loads: load(&stats.peer_loads),
            peer_errors: load(&stats.peer_errors),
            loads: load(&stats.loads),
            loads_deduped: load(&stats.loads_deduped),
            local_loads: load(&stats.local_loads),
            local_load_errs: load(&stats.local_load_errs),
            server_requests: load(&stats.server_requests),
            store,
        }
    }
}

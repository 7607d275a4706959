use std::sync::{Arc, OnceLock};

use super::types::{GroupStats, Loader, Stats};
use crate::error::{CacheError, CacheResult};
use crate::flight::FlightGroup;
use crate::peers::{PeerGetter, PeerPicker, PeerRequest};
use crate::store::{ByteView, Store};

/// A named cache namespace: a loader, a bounded local store and optional peer routing.
///
/// Created through [`new_group`](super::registry::new_group) and kept for the lifetime of
/// the process.
pub struct Group {
    core: Arc<GroupCore>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    /// Misses routed to another peer.
    peer_flight: FlightGroup<CacheResult<ByteView>>,
    /// Misses this node answers from its loader, for clients and peers alike.
    local_flight: FlightGroup<CacheResult<ByteView>>,
}

/// The part of a group a spawned load needs.
struct GroupCore {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: Store,
    stats: Stats,
}

impl Group {
    pub(crate) fn new(name: &str, cache_bytes: usize, loader: Arc<dyn Loader>) -> Self {
        Self {
            core: Arc::new(GroupCore {
                name: name.to_string(),
                loader,
                main_cache: Store::new(cache_bytes),
                stats: Stats::default(),
            }),
            peers: OnceLock::new(),
            peer_flight: FlightGroup::new(),
            local_flight: FlightGroup::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Attaches the peer picker used to route misses.
    ///
    /// # Panics
    /// If called more than once: swapping routing under live traffic is a configuration bug.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group '{}'", self.core.name);
        }
    }

    /// Returns the value for `key`, loading it from the owning peer or the local loader on a miss.
    ///
    /// Concurrent misses for the same key share one load and one result. A load keeps
    /// running even if every caller waiting on it goes away.
    pub async fn get(&self, key: &str) -> CacheResult<ByteView> {
        self.lookup(key, true).await
    }

    /// Like [`get`](Self::get), but never asks a peer and never shares a load that does.
    /// Used to answer peer requests.
    pub async fn get_local(&self, key: &str) -> CacheResult<ByteView> {
        Stats::incr(&self.core.stats.server_requests);
        self.lookup(key, false).await
    }

    /// Number of entries in the local store.
    pub fn len(&self) -> usize {
        self.core.main_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.main_cache.is_empty()
    }

    pub fn stats(&self) -> GroupStats {
        GroupStats::snapshot(&self.core.name, &self.core.stats, self.core.main_cache.stats())
    }

    async fn lookup(&self, key: &str, use_peers: bool) -> CacheResult<ByteView> {
        let core = &self.core;
        Stats::incr(&core.stats.gets);
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        if let Some(value) = core.main_cache.get(key) {
            tracing::debug!("[{}] cache hit for '{}'", core.name, key);
            Stats::incr(&core.stats.cache_hits);
            return Ok(value);
        }

        self.load(key, use_peers).await
    }

    async fn load(&self, key: &str, use_peers: bool) -> CacheResult<ByteView> {
        Stats::incr(&self.core.stats.loads);

        let peer = match self.peers.get() {
            Some(picker) if use_peers => picker.pick_peer(key),
            _ => None,
        };

        let core = self.core.clone();
        let owned_key = key.to_string();
        let (result, shared) = match peer {
            Some(peer) => {
                self.peer_flight
                    .call_shared(key, move || async move {
                        core.load_from_peer(peer.as_ref(), &owned_key).await
                    })
                    .await
            }
            None => {
                self.local_flight
                    .call_shared(key, move || async move { core.load_locally(&owned_key).await })
                    .await
            }
        };

        if shared {
            Stats::incr(&self.core.stats.loads_deduped);
        }
        result
    }
}

impl GroupCore {
    /// Asks the owning peer, falling back to the loader if the peer cannot answer.
    async fn load_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> CacheResult<ByteView> {
        match self.get_from_peer(peer, key).await {
            Ok(value) => {
                Stats::incr(&self.stats.peer_loads);
                Ok(value)
            }
            Err(e) => {
                Stats::incr(&self.stats.peer_errors);
                tracing::warn!(
                    "[{}] Failed to get '{}' from peer {}: {}",
                    self.name,
                    key,
                    peer.addr(),
                    e
                );
                self.load_locally(key).await
            }
        }
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> CacheResult<ByteView> {
        let request = PeerRequest::new(&self.name, key);
        let response = peer
            .get(&request)
            .await
            .map_err(|e| CacheError::Peer(e.to_string()))?;
        Ok(ByteView::from(response.value))
    }

    async fn load_locally(&self, key: &str) -> CacheResult<ByteView> {
        let bytes = match self.loader.load(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                Stats::incr(&self.stats.local_load_errs);
                return Err(CacheError::Load(e.to_string()));
            }
        };
        Stats::incr(&self.stats.local_loads);

        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}

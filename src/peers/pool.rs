use axum::{Extension, Router, routing::get};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::client::HttpGetter;
use super::handlers::handle_peer_get;
use super::{PeerGetter, PeerPicker};
use crate::config::CacheConfig;
use crate::ring::HashRing;

/// Ring and per-peer clients, always replaced together.
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// A node's view of its peers: picks the owner of a key and serves peer requests.
///
/// `self_addr` must appear in the peer list exactly as the other nodes spell it, otherwise
/// the node would route its own keys to itself over the wire.
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    timeout: Duration,
    attempts: usize,
    http_client: reqwest::Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    pub fn new(config: &CacheConfig) -> Arc<Self> {
        let pool = Arc::new(Self {
            self_addr: config.self_addr.clone(),
            base_path: config.base_path.clone(),
            replicas: config.replicas,
            timeout: config.peer_timeout,
            attempts: config.fetch_attempts,
            http_client: reqwest::Client::new(),
            state: RwLock::new(PoolState {
                ring: HashRing::new(config.replicas),
                getters: HashMap::new(),
            }),
        });
        if !config.peers.is_empty() {
            pool.set(&config.peers);
        }
        pool
    }

    /// Replaces the peer set. The new ring is built completely before it is swapped in,
    /// so concurrent picks see either the old or the new set.
    pub fn set<S: AsRef<str>>(&self, peers: &[S]) {
        let peers: Vec<&str> = peers
            .iter()
            .map(|peer| peer.as_ref().trim_end_matches('/'))
            .collect();

        let mut ring = HashRing::new(self.replicas);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|&peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.http_client.clone(),
                    self.timeout,
                    self.attempts,
                );
                (peer.to_string(), Arc::new(getter))
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
        tracing::info!("[Server {}] Peer set updated: {} peer(s)", self.self_addr, peers.len());
    }

    pub fn peers(&self) -> Vec<String> {
        self.state.read().ring.nodes().to_vec()
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Routes `GET <base_path><group>/<key>` to the peer handler.
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route(&format!("{}*rest", self.base_path), get(handle_peer_get))
            .route(&self.base_path, get(handle_peer_get))
            .layer(Extension(self.clone()))
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr.trim_end_matches('/') {
            return None;
        }
        tracing::debug!("[Server {}] Pick peer {}", self.self_addr, peer);
        let getter = state.getters.get(peer)?.clone();
        Some(getter as Arc<dyn PeerGetter>)
    }
}

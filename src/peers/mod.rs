//! Peer Transport Module
//!
//! Lets a node fetch a value from the peer that owns it, and answer the same requests
//! from its peers.
//!
//! ## Core Concepts
//! - **Picking**: `HttpPool` hashes the key onto the ring; if the owner is another node its
//!   `HttpGetter` is returned, if it is this node the caller loads locally.
//! - **Wire Format**: `GET <base_path><group>/<key>` answered with a protobuf `PeerResponse`.
//! - **Single Hop**: Requests carry a hop counter and are always answered from the local group.
//! - **Recoverable Failures**: Timeouts, bad statuses and decode errors are plain errors; the
//!   group falls back to its loader.
//!
//! ## Submodules
//! - **`protocol`**: Wire messages, path encoding and constants.
//! - **`client`**: `HttpGetter`, the HTTP client for one peer.
//! - **`pool`**: `HttpPool`, the ring-backed `PeerPicker` and its router.
//! - **`handlers`**: The axum handler serving peer requests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub mod client;
pub mod handlers;
pub mod pool;
pub mod protocol;

pub use client::HttpGetter;
pub use pool::HttpPool;
pub use protocol::{PeerRequest, PeerResponse};

/// Chooses the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns `None` when no peer owns the key or when this node owns it.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Retrieves a value from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, request: &PeerRequest) -> Result<PeerResponse>;

    /// Where requests go, for logging.
    fn addr(&self) -> &str;
}

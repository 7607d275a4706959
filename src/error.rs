//! Cache Error Taxonomy
//!
//! Every failure a caller of [`Group::get`](crate::group::group::Group::get) can observe.
//! The enum is `Clone` because a single-flight result is shared verbatim with every
//! joiner of the same call.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// A lookup was attempted with an empty key.
    #[error("key is required")]
    EmptyKey,

    /// Peer request path did not have the `<group>/<key>` shape.
    #[error("bad request: {0}")]
    MalformedPath(String),

    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// A group with this name was already created in this process.
    #[error("group already exists: {0}")]
    DuplicateGroup(String),

    /// The application loader failed for a key. Nothing was cached.
    #[error("{0}")]
    Load(String),

    /// Network, status or decode failure while talking to a peer.
    #[error("peer fetch failed: {0}")]
    Peer(String),

    #[error("codec error: {0}")]
    Codec(String),

    /// A peer request arrived that had already been forwarded once.
    #[error("peer request exceeded hop limit ({0} hops)")]
    HopLimit(u32),
}

impl CacheError {
    /// Input errors are rejected up front and never worth retrying.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CacheError::EmptyKey | CacheError::MalformedPath(_))
    }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

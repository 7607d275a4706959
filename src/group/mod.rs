//! Cache Group Module
//!
//! The façade that ties the store, the ring-backed peer picker and single-flight together.
//!
//! ## Lookup Flow
//! 1. **Validate**: An empty key is rejected.
//! 2. **Local Hit**: The group's store is consulted first.
//! 3. **Load**: On a miss, keys owned by another node are fetched from that peer, falling back
//!    to the loader if the fetch fails. Keys this node owns, and every peer request, go
//!    straight to the loader, whose result populates the store.
//!
//! Each route has its own single-flight table, so a peer request never waits on a load that
//! is itself forwarding to another node.
//!
//! Values fetched from a peer are returned but not cached here; the owning peer caches them.
//!
//! ## Submodules
//! - **`group`**: `Group` and its state machine.
//! - **`registry`**: Process-wide name → group map.
//! - **`types`**: The `Loader` capability and statistics.
//! - **`handlers`**: Client-facing HTTP API.

pub mod group;
pub mod handlers;
pub mod registry;
pub mod types;

pub use group::Group;
pub use registry::{get_group, group_names, new_group};
pub use types::{GroupStats, Loader, LoaderFn};

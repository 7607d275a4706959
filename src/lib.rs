//! Distributed Read-Through Cache Library
//!
//! This library crate defines the modules that make up a cache node.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! A lookup moves through the subsystems from the outside in:
//!
//! - **`group`**: The public façade. A named group checks its local store, routes misses
//!   to the owning peer and falls back to its loader. Also hosts the process-wide registry.
//! - **`peers`**: The peer transport. Picks the owner of a key, fetches values from it over
//!   HTTP and answers the same requests from other nodes.
//! - **`ring`**: Consistent hashing with virtual replicas, mapping keys to node ids.
//! - **`flight`**: Single-flight execution so concurrent misses for one key share one load.
//! - **`store`**: The byte-budgeted LRU and the immutable `ByteView` values it holds.
//! - **`config`** and **`error`**: Node configuration and the shared error type.

pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod peers;
pub mod ring;
pub mod store;

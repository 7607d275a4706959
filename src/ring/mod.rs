//! Consistent Hashing Module
//!
//! Decides which peer is authoritative for a key.
//!
//! ## Core Concepts
//! - **Virtual Nodes**: Every real node occupies `replicas` positions so keys spread evenly.
//! - **Ring Lookup**: Binary search for the first position at or after `hash(key)`, wrapping around.
//! - **Rebuild**: Membership changes rebuild the ring from the node list instead of patching it.

pub mod hashring;

pub use hashring::{HashFn, HashRing, crc32_ieee};

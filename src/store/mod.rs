//! Local Store Module
//!
//! The bounded, in-process half of the cache.
//!
//! ## Core Concepts
//! - **Byte Budget**: Capacity is counted as `len(key) + len(value)` per entry; `0` disables the bound.
//! - **LRU Eviction**: After each insert the least recently used entries are dropped until the budget holds.
//! - **Immutable Values**: Callers receive a `ByteView`, which never exposes the stored buffer for mutation.
//!
//! ## Submodules
//! - **`lru`**: The single-threaded LRU with eviction callbacks.
//! - **`cache`**: `Store`, the mutex-guarded wrapper a group owns.
//! - **`byteview`**: The immutable value type.

pub mod byteview;
pub mod cache;
pub mod lru;

pub use byteview::ByteView;
pub use cache::{Store, StoreStats};
pub use lru::{ByteSize, LruCache};

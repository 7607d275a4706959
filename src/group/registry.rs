//! Group Registry
//!
//! Process-wide map from group name to [`Group`]. Written only when a group is created,
//! read on every peer request, so it sits behind a reader/writer lock.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::group::Group;
use super::types::Loader;
use crate::error::{CacheError, CacheResult};

static GROUPS: Lazy<RwLock<HashMap<String, Arc<Group>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Creates and registers a group.
///
/// Names are unique for the lifetime of the process: creating a second group under an
/// existing name fails with [`CacheError::DuplicateGroup`] and leaves the first untouched.
///
/// # Arguments
/// * `name` - The namespace peers use to address this group.
/// * `cache_bytes` - Byte budget of the local store, `0` for unbounded.
/// * `loader` - Source of truth consulted on misses this node is responsible for.
pub fn new_group<L>(name: &str, cache_bytes: usize, loader: L) -> CacheResult<Arc<Group>>
where
    L: Loader + 'static,
{
    let mut groups = GROUPS.write();
    if groups.contains_key(name) {
        return Err(CacheError::DuplicateGroup(name.to_string()));
    }

    let group = Arc::new(Group::new(name, cache_bytes, Arc::new(loader)));
    groups.insert(name.to_string(), group.clone());

    tracing::info!("Created group '{}' ({} bytes)", name, cache_bytes);
    Ok(group)
}

/// Looks up a previously created group.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    GROUPS.read().get(name).cloned()
}

pub fn group_names() -> Vec<String> {
    let mut names: Vec<String> = GROUPS.read().keys().cloned().collect();
    names.sort();
    names
}

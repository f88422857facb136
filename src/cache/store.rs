//! Lock-based result cache.

use super::ResultStore;
use crate::collection::CollectionResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Point-in-time view of the cache, ordered by script identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    entries: BTreeMap<String, CollectionResult>,
}

impl CacheSnapshot {
    /// Iterates entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CollectionResult)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the entry for `identity`, if any.
    pub fn get(&self, identity: &str) -> Option<&CollectionResult> {
        self.entries.get(identity)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CollectionResult)> for CacheSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, CollectionResult)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Result cache guarded by a single structure-wide read/write lock.
///
/// Writers hold the lock for one insert; readers for one copy. With tens to
/// a few hundred scripts neither is long enough to matter.
#[derive(Debug, Default)]
pub struct SharedCache {
    entries: RwLock<BTreeMap<String, CollectionResult>>,
}

impl SharedCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached scripts.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a copy of the entry for `identity`, if any.
    pub fn get(&self, identity: &str) -> Option<CollectionResult> {
        self.entries.read().get(identity).cloned()
    }
}

impl ResultStore for SharedCache {
    fn put(&self, identity: String, result: CollectionResult) {
        self.entries.write().insert(identity, result);
    }

    fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            entries: self.entries.read().clone(),
        }
    }
}

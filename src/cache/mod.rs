//! Shared store of collection results.
//!
//! Many runner tasks write results concurrently while HTTP handlers take
//! snapshots. Callers only see the [`ResultStore`] trait, so the locking
//! strategy stays an implementation detail of [`SharedCache`].

mod store;

pub use store::{CacheSnapshot, SharedCache};

use crate::collection::CollectionResult;

/// Concurrently usable mapping from script identity to its latest result.
pub trait ResultStore: Send + Sync {
    /// Stores `result` for `identity`, replacing any previous entry entirely.
    fn put(&self, identity: String, result: CollectionResult);

    /// Returns a point-in-time copy of every entry.
    fn snapshot(&self) -> CacheSnapshot;
}

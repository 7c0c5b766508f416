use std::collections::{BTreeMap, BTreeSet};

use crate::index::inverted::{InvertedIndex, SearchResult};
use crate::sync::rwlock::{ReadGuard, ReadWriteLock};

/// Thread-safe façade over [`InvertedIndex`].
///
/// Every read runs under the read half of the lock and every mutation under
/// the write half; `merge` holds the write lock across its whole traversal.
/// Read views are copied out under the lock so callers never observe torn
/// state.
pub struct SharedIndex {
    inner: ReadWriteLock<InvertedIndex>,
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIndex {
    pub fn new() -> Self {
        SharedIndex {
            inner: ReadWriteLock::new(InvertedIndex::new()),
        }
    }

    pub fn with_index(index: InvertedIndex) -> Self {
        SharedIndex {
            inner: ReadWriteLock::new(index),
        }
    }

    pub fn add(&self, word: &str, location: &str, position: u64) -> bool {
        self.inner.write().add(word, location, position)
    }

    /// One write-critical section for the whole union.
    pub fn merge(&self, other: InvertedIndex) {
        self.inner.write().merge(other);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.inner.read().contains_location(word, location)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: u64) -> bool {
        self.inner.read().contains_position(word, location, position)
    }

    pub fn words(&self) -> Vec<String> {
        self.inner.read().words().map(str::to_string).collect()
    }

    pub fn locations(&self, word: &str) -> Vec<String> {
        self.inner.read().locations(word).map(str::to_string).collect()
    }

    pub fn positions(&self, word: &str, location: &str) -> Vec<u64> {
        self.inner.read().positions(word, location).collect()
    }

    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.inner.read().counts().clone()
    }

    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        self.inner.read().search(stems, exact)
    }

    /// Read-locked handle for traversals that must see one consistent
    /// snapshot (serialization holds this for its whole run).
    pub fn read(&self) -> ReadGuard<'_, InvertedIndex> {
        self.inner.read()
    }

    pub fn into_inner(self) -> InvertedIndex {
        self.inner.into_inner()
    }
}

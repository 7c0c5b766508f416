pub mod inverted;
pub mod shared;

use std::collections::{BTreeMap, BTreeSet};

pub use inverted::{InvertedIndex, SearchResult};
pub use shared::SharedIndex;

/// The capability set shared by the plain index and its locked wrapper, so
/// builders and query engines can be written once against either.
pub trait DocumentIndex {
    /// Records one `(word, location, position)` occurrence.
    fn add(&mut self, word: &str, location: &str, position: u64) -> bool;

    /// Bulk-unions another index into this one.
    fn merge(&mut self, other: InvertedIndex);

    /// Ranked search over a sorted set of query stems.
    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult>;

    /// Snapshot of the per-location word counts.
    fn word_counts(&self) -> BTreeMap<String, u64>;

    fn has_word(&self, word: &str) -> bool;
}

impl DocumentIndex for InvertedIndex {
    fn add(&mut self, word: &str, location: &str, position: u64) -> bool {
        InvertedIndex::add(self, word, location, position)
    }

    fn merge(&mut self, other: InvertedIndex) {
        InvertedIndex::merge(self, other)
    }

    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        InvertedIndex::search(self, stems, exact)
    }

    fn word_counts(&self) -> BTreeMap<String, u64> {
        self.counts().clone()
    }

    fn has_word(&self, word: &str) -> bool {
        self.contains(word)
    }
}

impl DocumentIndex for SharedIndex {
    fn add(&mut self, word: &str, location: &str, position: u64) -> bool {
        SharedIndex::add(self, word, location, position)
    }

    fn merge(&mut self, other: InvertedIndex) {
        SharedIndex::merge(self, other)
    }

    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        SharedIndex::search(self, stems, exact)
    }

    fn word_counts(&self) -> BTreeMap<String, u64> {
        SharedIndex::counts(self)
    }

    fn has_word(&self, word: &str) -> bool {
        SharedIndex::contains(self, word)
    }
}

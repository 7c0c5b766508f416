use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;

use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::index::shared::SharedIndex;
use crate::index::{DocumentIndex, SearchResult};
use crate::sync::work_queue::WorkQueue;

/// A query's canonical form: its sorted stems joined by single spaces.
fn canonical_form(stems: &BTreeSet<String>) -> String {
    stems
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn reject_directories(input: &Path) -> Result<()> {
    if input.is_dir() {
        return Err(Error::new(
            ErrorKind::WrongInputKind,
            format!("query path {} is a directory", input.display()),
        ));
    }
    Ok(())
}

/// Sequential query runner over any index implementation.
///
/// Each line reduces to its canonical stem set; blank reductions are
/// skipped and a canonical form already answered is never searched again.
pub struct QueryEngine<'a, I: DocumentIndex> {
    index: &'a I,
    analyzer: Analyzer,
    results: BTreeMap<String, Vec<SearchResult>>,
}

impl<'a, I: DocumentIndex> QueryEngine<'a, I> {
    pub fn new(index: &'a I) -> Self {
        QueryEngine {
            index,
            analyzer: Analyzer::standard_english(),
            results: BTreeMap::new(),
        }
    }

    pub fn parse_query_file(&mut self, input: &Path, exact: bool) -> Result<()> {
        reject_directories(input)?;
        let reader = BufReader::new(File::open(input)?);
        for line in reader.lines() {
            self.parse_line(&line?, exact);
        }
        Ok(())
    }

    pub fn parse_line(&mut self, line: &str, exact: bool) {
        let stems = self.analyzer.unique_stems(line);
        if stems.is_empty() {
            return;
        }

        let canonical = canonical_form(&stems);
        if self.results.contains_key(&canonical) {
            trace!("duplicate query {:?} skipped", canonical);
            return;
        }

        let matches = self.index.search(&stems, exact);
        self.results.insert(canonical, matches);
    }

    pub fn results(&self) -> &BTreeMap<String, Vec<SearchResult>> {
        &self.results
    }

    pub fn into_results(self) -> BTreeMap<String, Vec<SearchResult>> {
        self.results
    }
}

/// Concurrent query runner: one queue task per line.
///
/// The results map is its own monitor. A task first reserves its canonical
/// key with an empty list under the lock, runs the search unlocked, then
/// fills the reserved slot; two lines with the same canonical form can
/// therefore never both reach the search.
pub struct ConcurrentQueryEngine {
    index: Arc<SharedIndex>,
    queue: Arc<WorkQueue>,
    analyzer: Arc<Analyzer>,
    results: Arc<Mutex<BTreeMap<String, Vec<SearchResult>>>>,
}

impl ConcurrentQueryEngine {
    pub fn new(index: Arc<SharedIndex>, queue: Arc<WorkQueue>) -> Self {
        ConcurrentQueryEngine {
            index,
            queue,
            analyzer: Arc::new(Analyzer::standard_english()),
            results: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn parse_query_file(&self, input: &Path, exact: bool) -> Result<()> {
        reject_directories(input)?;
        let reader = BufReader::new(File::open(input)?);
        for line in reader.lines() {
            let line = line?;
            let index = Arc::clone(&self.index);
            let analyzer = Arc::clone(&self.analyzer);
            let results = Arc::clone(&self.results);
            self.queue.execute(move || {
                let stems = analyzer.unique_stems(&line);
                if stems.is_empty() {
                    return;
                }
                let canonical = canonical_form(&stems);

                {
                    let mut results = results.lock();
                    if results.contains_key(&canonical) {
                        trace!("duplicate query {:?} skipped", canonical);
                        return;
                    }
                    // Reserve the key so an equal line cannot search too.
                    results.insert(canonical.clone(), Vec::new());
                }

                let matches = index.search(&stems, exact);
                results.lock().insert(canonical, matches);
            });
        }

        debug!("all query lines submitted, waiting for the queue");
        self.queue.finish();
        Ok(())
    }

    /// Copy of the results; call after `parse_query_file` has returned.
    pub fn results(&self) -> BTreeMap<String, Vec<SearchResult>> {
        self.results.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::inverted::InvertedIndex;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn fruit_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add("appl", "A", 1);
        index.add("appl", "A", 2);
        index.add("banana", "A", 3);
        index.add("banana", "B", 1);
        index.add("cherri", "B", 2);
        index
    }

    /// Counts searches so query de-duplication is observable.
    struct CountingIndex {
        inner: InvertedIndex,
        searches: Cell<usize>,
    }

    impl DocumentIndex for CountingIndex {
        fn add(&mut self, word: &str, location: &str, position: u64) -> bool {
            self.inner.add(word, location, position)
        }

        fn merge(&mut self, other: InvertedIndex) {
            self.inner.merge(other)
        }

        fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
            self.searches.set(self.searches.get() + 1);
            self.inner.search(stems, exact)
        }

        fn word_counts(&self) -> BTreeMap<String, u64> {
            self.inner.counts().clone()
        }

        fn has_word(&self, word: &str) -> bool {
            self.inner.contains(word)
        }
    }

    #[test]
    fn queries_are_canonicalized_and_answered() {
        let index = fruit_index();
        let mut engine = QueryEngine::new(&index);
        engine.parse_line("BANANA!", true);

        let results = engine.results();
        let matches = &results["banana"];
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].location, "B");
    }

    #[test]
    fn reordered_lines_share_one_canonical_entry() {
        let index = CountingIndex {
            inner: fruit_index(),
            searches: Cell::new(0),
        };
        let mut engine = QueryEngine::new(&index);
        engine.parse_line("banana apple", false);
        engine.parse_line("apple   banana", false);
        engine.parse_line("Apples, Bananas", false);

        assert_eq!(engine.results().len(), 1);
        assert!(engine.results().contains_key("appl banana"));
        assert_eq!(index.searches.get(), 1, "duplicate canonical form searched");
    }

    #[test]
    fn blank_lines_produce_no_entries() {
        let index = fruit_index();
        let mut engine = QueryEngine::new(&index);
        engine.parse_line("", true);
        engine.parse_line("   \t ", true);
        engine.parse_line("123 !!", true);

        assert!(engine.results().is_empty());
    }

    #[test]
    fn unmatched_query_keeps_an_empty_entry() {
        let index = fruit_index();
        let mut engine = QueryEngine::new(&index);
        engine.parse_line("zebra", true);

        assert!(engine.results().contains_key("zebra"));
        assert!(engine.results()["zebra"].is_empty());
    }

    #[test]
    fn query_file_must_not_be_a_directory() {
        let dir = TempDir::new().unwrap();
        let index = fruit_index();
        let mut engine = QueryEngine::new(&index);

        let err = engine.parse_query_file(dir.path(), true).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::WrongInputKind));
    }

    #[test]
    fn concurrent_engine_matches_sequential_results() {
        let dir = TempDir::new().unwrap();
        let queries = dir.path().join("queries.txt");
        fs::write(&queries, "banana\napple banana\nbanana apple\n\ncherry\n").unwrap();

        let plain = fruit_index();
        let mut sequential = QueryEngine::new(&plain);
        sequential.parse_query_file(&queries, true).unwrap();

        let shared = Arc::new(SharedIndex::with_index(fruit_index()));
        let queue = Arc::new(WorkQueue::new(4));
        let concurrent = ConcurrentQueryEngine::new(shared, Arc::clone(&queue));
        concurrent.parse_query_file(&queries, true).unwrap();
        queue.shutdown();

        assert_eq!(sequential.results(), &concurrent.results());
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::analysis::analyzer::Analyzer;
use crate::build::walker::find_text_files;
use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::index::shared::SharedIndex;
use crate::index::DocumentIndex;
use crate::sync::work_queue::WorkQueue;

/// A file's location string: its canonicalized absolute path, or the path
/// as given if canonicalization fails.
fn location_string(input: &Path) -> String {
    match input.canonicalize() {
        Ok(absolute) => absolute.to_string_lossy().into_owned(),
        Err(err) => {
            debug!("could not canonicalize {}: {}", input.display(), err);
            input.to_string_lossy().into_owned()
        }
    }
}

/// Indexes one file into any index: UTF-8 lines, stems added under a single
/// per-file position counter so positions reflect source order 1, 2, 3, …
pub fn add_file<I: DocumentIndex>(input: &Path, index: &mut I, analyzer: &Analyzer) -> Result<()> {
    let location = location_string(input);
    let reader = BufReader::new(File::open(input)?);

    let mut position = 0u64;
    for line in reader.lines() {
        let line = line?;
        for token in analyzer.analyze(&line) {
            position += 1;
            index.add(&token.text, &location, position);
        }
    }
    trace!("indexed {} tokens from {}", position, location);
    Ok(())
}

/// Sequential build: walk, filter, index every file in turn. A file that
/// fails to read is logged and skipped; the build continues.
pub fn build<I: DocumentIndex>(root: &Path, index: &mut I, analyzer: &Analyzer) {
    for file in find_text_files(root) {
        if let Err(err) = add_file(&file, index, analyzer) {
            warn!("could not index {}: {}", file.display(), err);
        }
    }
}

/// Parallel build: one task per file, each indexing into a fresh local
/// index merged into the shared one in a single write-critical section, so
/// workers never contend on the write lock per token.
pub struct ParallelIndexBuilder {
    index: Arc<SharedIndex>,
    analyzer: Arc<Analyzer>,
}

impl ParallelIndexBuilder {
    pub fn new(index: Arc<SharedIndex>) -> Self {
        ParallelIndexBuilder {
            index,
            analyzer: Arc::new(Analyzer::standard_english()),
        }
    }

    /// Submits one task per discovered file, then waits out the queue.
    pub fn build(&self, root: &Path, queue: &WorkQueue) {
        for file in find_text_files(root) {
            let index = Arc::clone(&self.index);
            let analyzer = Arc::clone(&self.analyzer);
            queue.execute(move || {
                let mut local = InvertedIndex::new();
                if let Err(err) = add_file(&file, &mut local, &analyzer) {
                    // Tokens indexed before the failure still merge.
                    warn!("could not fully index {}: {}", file.display(), err);
                }
                index.merge(local);
            });
        }
        debug!("all files submitted, waiting for the queue");
        queue.finish();
    }
}

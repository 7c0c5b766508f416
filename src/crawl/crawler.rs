use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, trace, warn};
use parking_lot::Mutex;
use url::Url;

use crate::analysis::analyzer::Analyzer;
use crate::core::config::CrawlConfig;
use crate::core::error::Result;
use crate::crawl::fetch::HtmlFetcher;
use crate::crawl::html::strip_html;
use crate::crawl::links;
use crate::index::inverted::InvertedIndex;
use crate::index::shared::SharedIndex;
use crate::sync::work_queue::WorkQueue;

/// Bounded breadth-first crawler.
///
/// A shared set of cleaned URLs enforces both uniqueness and the crawl
/// limit: a URL is admitted only if the set is below the limit and the
/// insert is new, checked and inserted under one critical section. Each
/// admitted URL becomes a queue task that fetches the page, admits its
/// outbound links (before indexing, to widen the wavefront early), indexes
/// the stripped text into a task-local index and merges that into the
/// shared one.
pub struct WebCrawler {
    index: Arc<SharedIndex>,
    queue: Arc<WorkQueue>,
    fetcher: HtmlFetcher,
    analyzer: Analyzer,
    consumed: Mutex<HashSet<Url>>,
    limit: usize,
    redirects: u32,
}

impl WebCrawler {
    pub fn new(index: Arc<SharedIndex>, queue: Arc<WorkQueue>, config: &CrawlConfig) -> Result<Self> {
        Ok(WebCrawler {
            index,
            queue,
            fetcher: HtmlFetcher::new()?,
            analyzer: Analyzer::standard_english(),
            consumed: Mutex::new(HashSet::new()),
            limit: config.limit.max(1),
            redirects: config.redirects,
        })
    }

    /// Admits the seed, then blocks until the whole wavefront has drained.
    pub fn crawl(self: Arc<Self>, seed: Url) {
        let seed = links::clean(seed);
        {
            let mut consumed = self.consumed.lock();
            if consumed.len() >= self.limit || !consumed.insert(seed.clone()) {
                return;
            }
        }

        let crawler = Arc::clone(&self);
        self.queue.execute(move || crawler.crawl_task(seed));
        debug!("seed submitted, waiting for the crawl to settle");
        self.queue.finish();
    }

    /// URLs admitted so far (the final corpus size once `crawl` returns).
    pub fn visited(&self) -> usize {
        self.consumed.lock().len()
    }

    fn crawl_task(self: Arc<Self>, url: Url) {
        trace!("crawling {}", url);
        let Some(html) = self.fetcher.fetch(&url, self.redirects) else {
            return;
        };

        let references = links::list_links(&url, &html);
        {
            let mut consumed = self.consumed.lock();
            for reference in references {
                if consumed.len() >= self.limit {
                    break;
                }
                if consumed.insert(reference.clone()) {
                    let crawler = Arc::clone(&self);
                    self.queue.execute(move || crawler.crawl_task(reference));
                }
            }
        }

        let text = strip_html(&html);
        let mut local = InvertedIndex::new();
        for token in self.analyzer.analyze(&text) {
            local.add(&token.text, url.as_str(), token.position);
        }
        if local.counts().is_empty() {
            warn!("{} produced no indexable text", url);
        }
        self.index.merge(local);
        debug!("merged {} into the shared index", url);
    }
}

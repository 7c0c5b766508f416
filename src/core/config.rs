/// Crawl bounds
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub limit: usize,       // Max URLs admitted, seed included
    pub redirects: u32,     // Redirect depth per fetch
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            limit: 50,
            redirects: 3,
        }
    }
}

/// Runtime knobs shared by the parallel build, crawl and query phases.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub workers: usize,     // Worker thread count for the queue
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig { workers: 5 }
    }
}

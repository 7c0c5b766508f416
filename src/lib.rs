pub mod analysis;
pub mod build;
pub mod core;
pub mod crawl;
pub mod index;
pub mod output;
pub mod query;
pub mod sync;

/*
┌──────────────────────────── SEARCHIVE ARCHITECTURE ────────────────────────────┐
│                                                                                 │
│  INPUTS                    BUILD / CRAWL                 CORE                   │
│  ──────                    ─────────────                 ────                   │
│  file tree ──walker──► build::builder ──┐                                       │
│                          (per-file local │    merge    ┌─────────────────────┐  │
│  seed URL ──fetch/links─► crawl::crawler─┼───────────► │ index::SharedIndex  │  │
│                          (per-page local │  (write     │  ReadWriteLock<     │  │
│                           InvertedIndex) ┘   lock)     │   InvertedIndex>    │  │
│                                                        └──────────┬──────────┘  │
│  sync::WorkQueue carries every build / crawl / query task         │ search     │
│  (FIFO + pending counter + finish barrier)                        │ (read      │
│                                                                   ▼  lock)     │
│  query file ──► query::engine ── canonical stem sets ──► ranked SearchResults   │
│                                                                   │             │
│  analysis::Analyzer = LetterTokenizer → lowercase → Snowball      ▼             │
│                                                        output::json (tabs,      │
│                                                         sorted keys, %.8f)      │
└─────────────────────────────────────────────────────────────────────────────────┘
*/

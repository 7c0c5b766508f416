use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use log::warn;
use serde::Serialize;
use url::Url;

use searchive::analysis::analyzer::Analyzer;
use searchive::build::{build, ParallelIndexBuilder};
use searchive::core::config::{CrawlConfig, RuntimeConfig};
use searchive::crawl::WebCrawler;
use searchive::index::{InvertedIndex, SharedIndex};
use searchive::output;
use searchive::query::{ConcurrentQueryEngine, QueryEngine};
use searchive::sync::WorkQueue;

/// Builds an inverted index over a file tree or a bounded web crawl, then
/// answers ranked search queries against it.
#[derive(Parser, Debug)]
#[command(name = "searchive", version)]
struct Args {
    /// Index all text files under this directory (or a single text file)
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Crawl starting from this seed URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Maximum number of URLs to crawl
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "50")]
    limit: Option<String>,

    /// Build and query on N worker threads instead of sequentially
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "5")]
    threads: Option<String>,

    /// Write the inverted index as pretty JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// Write per-location word counts as pretty JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,

    /// Read search queries from this file, one query per line
    #[arg(long, value_name = "PATH")]
    query: Option<PathBuf>,

    /// Exact matching instead of prefix matching
    #[arg(long)]
    exact: bool,

    /// Write ranked query results as pretty JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let start = Instant::now();

    run(Args::parse());

    let seconds = start.elapsed().as_secs_f64();
    println!("Elapsed: {:.6} seconds", seconds);
}

/// Soft failures are reported and skipped; the process always completes.
fn run(args: Args) {
    let threads = args
        .threads
        .as_deref()
        .map(|raw| parse_count(raw, RuntimeConfig::default().workers, "--threads"));

    if args.url.is_some() {
        run_crawl(&args, threads);
    } else if args.path.is_some() {
        match threads {
            Some(workers) => run_parallel_build(&args, workers),
            None => run_sequential_build(&args),
        }
    } else {
        println!("A corpus input is required: --path <dir-or-file> or --url <seed>");
        println!("Ex:\n  searchive --path corpus/ --index --query queries.txt --results");
    }
}

/// Lenient numeric flags: anything unparsable or zero falls back.
fn parse_count(raw: &str, default: usize, flag: &str) -> usize {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => n,
        _ => {
            warn!("invalid value {:?} for {}, using {}", raw, flag, default);
            default
        }
    }
}

fn run_sequential_build(args: &Args) {
    let Some(root) = args.path.as_deref() else {
        return;
    };
    let mut index = InvertedIndex::new();

    if root.exists() {
        build(root, &mut index, &Analyzer::standard_english());
    } else {
        eprintln!("Input path {} does not exist; nothing indexed.", root.display());
    }

    emit_artifacts(&index, args);
    run_queries_sequential(&index, args);
}

fn run_parallel_build(args: &Args, workers: usize) {
    let Some(root) = args.path.as_deref() else {
        return;
    };
    let queue = Arc::new(WorkQueue::new(workers));
    let shared = Arc::new(SharedIndex::new());

    if root.exists() {
        ParallelIndexBuilder::new(Arc::clone(&shared)).build(root, &queue);
    } else {
        eprintln!("Input path {} does not exist; nothing indexed.", root.display());
    }

    {
        let guard = shared.read();
        emit_artifacts(&guard, args);
    }
    run_queries_concurrent(&shared, &queue, args);
    queue.shutdown();
}

/// Crawling always runs on a work queue; `--threads` widens it and also
/// parallelizes the query phase.
fn run_crawl(args: &Args, threads: Option<usize>) {
    let Some(seed_raw) = args.url.as_deref() else {
        return;
    };
    let workers = threads.unwrap_or(RuntimeConfig::default().workers);
    let config = CrawlConfig {
        limit: args
            .limit
            .as_deref()
            .map(|raw| parse_count(raw, CrawlConfig::default().limit, "--limit"))
            .unwrap_or(CrawlConfig::default().limit),
        ..CrawlConfig::default()
    };

    let queue = Arc::new(WorkQueue::new(workers));
    let shared = Arc::new(SharedIndex::new());

    match Url::parse(seed_raw) {
        Ok(seed) => match WebCrawler::new(Arc::clone(&shared), Arc::clone(&queue), &config) {
            Ok(crawler) => Arc::new(crawler).crawl(seed),
            Err(err) => eprintln!("Could not start the crawler: {}", err),
        },
        Err(err) => eprintln!("Seed URL {:?} could not be parsed: {}", seed_raw, err),
    }

    {
        let guard = shared.read();
        emit_artifacts(&guard, args);
    }
    run_queries_concurrent(&shared, &queue, args);
    queue.shutdown();
}

fn emit_artifacts(index: &InvertedIndex, args: &Args) {
    if let Some(output_path) = &args.index {
        write_artifact(index, output_path, "index");
    }
    if let Some(output_path) = &args.counts {
        write_artifact(index.counts(), output_path, "counts");
    }
}

fn write_artifact<T: Serialize + ?Sized>(value: &T, output_path: &Path, what: &str) {
    if let Err(err) = output::write_file(value, output_path) {
        eprintln!(
            "Output path {} for {} could not be written: {}",
            output_path.display(),
            what,
            err
        );
    }
}

fn run_queries_sequential(index: &InvertedIndex, args: &Args) {
    let Some(input) = &args.query else {
        return;
    };
    if !input.exists() {
        eprintln!("Query path {} does not exist; no queries run.", input.display());
        return;
    }

    let mut engine = QueryEngine::new(index);
    match engine.parse_query_file(input, args.exact) {
        Ok(()) => {
            if let Some(output_path) = &args.results {
                write_artifact(engine.results(), output_path, "results");
            }
        }
        Err(err) => eprintln!("Query file could not be processed: {}", err),
    }
}

fn run_queries_concurrent(shared: &Arc<SharedIndex>, queue: &Arc<WorkQueue>, args: &Args) {
    let Some(input) = &args.query else {
        return;
    };
    if !input.exists() {
        eprintln!("Query path {} does not exist; no queries run.", input.display());
        return;
    }

    let engine = ConcurrentQueryEngine::new(Arc::clone(shared), Arc::clone(queue));
    match engine.parse_query_file(input, args.exact) {
        Ok(()) => {
            if let Some(output_path) = &args.results {
                write_artifact(&engine.results(), output_path, "results");
            }
        }
        Err(err) => eprintln!("Query file could not be processed: {}", err),
    }
}

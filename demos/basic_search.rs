/// Searchive API demo
///
/// Builds a small index by hand through the analyzer, runs prefix and
/// exact searches, and prints the results the driver would serialize.
use std::collections::BTreeSet;

use searchive::analysis::analyzer::Analyzer;
use searchive::index::InvertedIndex;
use searchive::output;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = Analyzer::standard_english();
    let mut index = InvertedIndex::new();

    let corpus = [
        ("memo-one", "The quick brown fox jumps over the lazy dog"),
        ("memo-two", "Quick thinking foxes outfox lazy dogs daily"),
        ("memo-three", "Practice makes practices practical"),
    ];

    for (location, text) in corpus {
        for token in analyzer.analyze(text) {
            index.add(&token.text, location, token.position);
        }
    }

    println!("Indexed {} words over {} documents\n", index.num_words(), index.counts().len());

    for (line, exact) in [("fox", false), ("practice", true), ("lazy dog", true)] {
        let stems: BTreeSet<String> = analyzer.unique_stems(line);
        let results = index.search(&stems, exact);

        let mode = if exact { "exact" } else { "prefix" };
        println!("Query {:?} ({}): {} match(es)", line, mode, results.len());
        for result in &results {
            println!(
                "  {} count={} score={:.8}",
                result.location, result.count, result.score
            );
        }
        println!();
    }

    println!("index.json would contain:");
    print!("{}", output::to_string_pretty(&index)?);

    Ok(())
}

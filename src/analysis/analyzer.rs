use std::collections::BTreeSet;

use rust_stemmers::Algorithm;

use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{LetterTokenizer, Tokenizer};

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
}

impl Analyzer {
    pub fn new(tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Sorted, de-duplicated stems of one line. The set form used by queries.
    pub fn unique_stems(&self, line: &str) -> BTreeSet<String> {
        self.analyze(line)
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    /// Standard analyzer for English: letters only, lowercase, Snowball stem.
    pub fn standard_english() -> Self {
        Analyzer::new(Box::new(LetterTokenizer))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StemmerFilter::new(Algorithm::English)))
    }
}

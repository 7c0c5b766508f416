use unicode_normalization::UnicodeNormalization;

use crate::analysis::token::Token;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Tokenizer that keeps alphabetic code points only.
///
/// Text is NFD-decomposed first so accented letters reduce to their base
/// letter once the combining marks are dropped. Everything that is not
/// alphabetic acts as a token boundary. Positions are 1-indexed.
#[derive(Clone, Default)]
pub struct LetterTokenizer;

impl Tokenizer for LetterTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let cleaned: String = text
            .nfd()
            .map(|c| if c.is_alphabetic() { c } else { ' ' })
            .collect();

        let mut tokens = Vec::new();
        let mut position = 0u64;

        for word in cleaned.split_whitespace() {
            position += 1;
            tokens.push(Token::new(word.to_string(), position));
        }

        tokens
    }

    fn name(&self) -> &str {
        "letter"
    }
}

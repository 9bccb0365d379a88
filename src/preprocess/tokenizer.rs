//! Definition tokenization.

use regex::Regex;
use std::collections::HashSet;

/// Turns a definition string into an ordered, de-duplicated token list.
///
/// Implementations must be deterministic: the output order feeds the
/// graph's adjacency construction order.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, definition: &str) -> Vec<String>;
}

/// Default tokenizer: lowercases, extracts alphabetic words, drops
/// stop words and single-character tokens.
///
/// Deliberately simple — a host wanting real lemmatization plugs its
/// own [`Tokenizer`] in. Good enough for edge discovery because only
/// tokens that are themselves headwords ever become edges.
pub struct DefaultTokenizer {
    word_regex: Regex,
    stop_words: HashSet<&'static str>,
}

/// Function words that carry no relation signal.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "as", "is", "are", "was", "were", "be", "been", "being", "have",
    "has", "had", "do", "does", "did", "will", "would", "should", "could", "what",
    "which", "who", "where", "when", "why", "how", "this", "that", "these", "those",
    "it", "its", "not", "no", "so", "such", "than", "then", "there", "their", "they",
    "one", "any", "all", "some", "into", "upon", "about", "also", "other", "used",
];

impl DefaultTokenizer {
    pub fn new() -> Self {
        Self {
            // Words with an optional internal apostrophe (e.g. "o'clock")
            word_regex: Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("invalid token regex"),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl Default for DefaultTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for DefaultTokenizer {
    fn tokenize(&self, definition: &str) -> Vec<String> {
        let lowered = definition.to_lowercase();
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for m in self.word_regex.find_iter(&lowered) {
            let token = m.as_str();
            if token.len() < 2 || self.stop_words.contains(token) {
                continue;
            }
            if seen.insert(token.to_string()) {
                tokens.push(token.to_string());
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let t = DefaultTokenizer::new();
        let tokens = t.tokenize("A small domesticated feline animal.");
        assert_eq!(tokens, vec!["small", "domesticated", "feline", "animal"]);
    }

    #[test]
    fn test_tokenize_lowercases() {
        let t = DefaultTokenizer::new();
        let tokens = t.tokenize("FELINE Mammal");
        assert_eq!(tokens, vec!["feline", "mammal"]);
    }

    #[test]
    fn test_tokenize_dedupes_preserving_order() {
        let t = DefaultTokenizer::new();
        let tokens = t.tokenize("water, water everywhere; salt water");
        assert_eq!(tokens, vec!["water", "everywhere", "salt"]);
    }

    #[test]
    fn test_tokenize_strips_punctuation_and_digits() {
        let t = DefaultTokenizer::new();
        let tokens = t.tokenize("circa 1900: (archaic) horse-drawn carriage!");
        assert_eq!(tokens, vec!["circa", "archaic", "horse", "drawn", "carriage"]);
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        let t = DefaultTokenizer::new();
        let tokens = t.tokenize("the state of being a thing");
        assert_eq!(tokens, vec!["state", "thing"]);
    }

    #[test]
    fn test_tokenize_empty_definition() {
        let t = DefaultTokenizer::new();
        assert!(t.tokenize("").is_empty());
        assert!(t.tokenize("   ").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_apostrophe_words() {
        let t = DefaultTokenizer::new();
        let tokens = t.tokenize("shortly before o'clock");
        assert_eq!(tokens, vec!["shortly", "before", "o'clock"]);
    }
}

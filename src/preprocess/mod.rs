//! Dictionary preprocessing: turning raw definitions into ordered,
//! de-duplicated token lists the graph builder consumes.
//!
//! The NLP step is behind the [`Tokenizer`] trait and passed explicitly
//! wherever it is used, so tests (and hosts with a real lemmatizer) can
//! substitute their own implementation.

mod dictionary;
mod tokenizer;

pub use dictionary::{load_entries, process_dictionary, save_entries};
pub use tokenizer::{DefaultTokenizer, Tokenizer};

use serde::{Deserialize, Serialize};

/// A headword with the processed tokens of its definition.
///
/// Token order follows the definition text with duplicates removed;
/// it becomes the graph's adjacency construction order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEntry {
    pub word: String,
    pub tokens: Vec<String>,
}

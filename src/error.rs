use thiserror::Error;

/// Main error type for lexigraph
#[derive(Error, Debug)]
pub enum LexigraphError {
    /// Graph store read/write errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dictionary parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested word is not a node of the graph
    #[error("Word not found in graph: {0}")]
    WordNotFound(String),

    /// Invalid request parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using LexigraphError
pub type Result<T> = std::result::Result<T, LexigraphError>;

//! Error types for lawdesk

use thiserror::Error;

/// Result type alias for lawdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lawdesk operations
#[derive(Error, Debug)]
pub enum Error {
    /// The corpus could not be turned into a searchable index
    #[error("ingest error: {0}")]
    Ingest(String),

    /// A single source file could not be parsed
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Embedding batch rejected by the vector store
    #[error("invalid embeddings: {0}")]
    InvalidEmbeddings(String),

    /// Failed to store, persist or restore the vector store
    #[error("store error: {0}")]
    Store(String),

    /// Language detection or translation failed
    #[error("translation error: {0}")]
    Translation(String),

    /// A request or configuration value was rejected
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(file: impl Into<String>, err: impl ToString) -> Self {
        Self::Parse {
            file: file.into(),
            message: err.to_string(),
        }
    }

    /// Returns `true` if the error was caused by the caller rather than the service.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

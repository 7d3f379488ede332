//! Error types for the document portal pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage could not be created or written
    #[error("Storage unavailable at {path:?}: {message}")]
    StorageUnavailable { path: PathBuf, message: String },

    /// Encrypted, corrupt, or undecodable file
    #[error("Unreadable document '{filename}': {message}")]
    UnreadableDocument { filename: String, message: String },

    /// File extension outside the supported set
    #[error("Unsupported file type '{extension}' for '{filename}'")]
    UnsupportedFileType { filename: String, extension: String },

    /// An entire ingestion batch produced zero usable text
    #[error("No ingestible content in batch for session '{session_id}'")]
    NoIngestibleContent { session_id: String },

    /// Embedding provider failure
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Embedder returned a vector of the wrong dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },

    /// No persisted index at the expected location
    #[error("No vector index found at {path:?}")]
    IndexNotFound { path: PathBuf },

    /// Query referenced a session id that was never created
    #[error("Unknown session '{session_id}'")]
    UnknownSession { session_id: String },

    /// Language-generation capability failure
    #[error("Answer generation failed: {0}")]
    Generation(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a storage error from an IO failure
    pub fn storage(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create an unreadable-document error
    pub fn unreadable(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Whether this failure skips a single file rather than aborting a batch
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            Self::UnreadableDocument { .. } | Self::UnsupportedFileType { .. }
        )
    }
}

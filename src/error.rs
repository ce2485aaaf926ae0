//! Error types for paging and feeds.

use thiserror::Error;

/// Main error type for page fetches and feed sessions.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FeedError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    #[error("Malformed document {key}: {reason}")]
    DataIntegrity { key: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedError {
    pub(crate) fn data_integrity(key: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedError::DataIntegrity {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether replaying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FeedError::Transport(_))
    }

    /// Whether the pagination frontier is gone and the session must restart.
    pub fn requires_reset(&self) -> bool {
        matches!(self, FeedError::NotFound { .. })
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Config(e.to_string())
    }
}

/// Result type for paging operations.
pub type Result<T> = std::result::Result<T, FeedError>;

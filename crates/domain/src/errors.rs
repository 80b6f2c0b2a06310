//! Error types used throughout the sync pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for BoardSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BoardSyncError {
    /// The transport dropped the connection mid-request. This is the only
    /// failure the retry executor treats as transient.
    #[error("Connection reset: {0}")]
    ConnectionReset(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The change feed rejected the sync cursor (HTTP 410 Gone).
    #[error("Sync cursor invalidated: {0}")]
    CursorInvalidated(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A remote API answered, but reported a failure in its payload.
    #[error("Remote API error: {0}")]
    Remote(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardSyncError {
    /// Whether the retry executor may attempt the failed call again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionReset(_))
    }

    /// Whether the change feed signalled that the cursor is no longer valid.
    pub fn is_cursor_invalidated(&self) -> bool {
        matches!(self, Self::CursorInvalidated(_))
    }
}

impl From<serde_json::Error> for BoardSyncError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidInput(format!("malformed JSON payload: {value}"))
    }
}

/// Result type alias for BoardSync operations
pub type Result<T> = std::result::Result<T, BoardSyncError>;

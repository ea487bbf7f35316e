//! Error types for knowledge-base access

use std::time::Duration;

/// Errors from triplestore connections and queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KbError {
    /// Settings blob could not be interpreted
    #[error("invalid triplestore settings: {0}")]
    InvalidSettings(String),

    /// Connector cannot serve the requested backend
    #[error("unsupported triplestore backend: '{0}'")]
    UnsupportedBackend(String),

    /// Connecting to the store failed
    #[error("failed to connect to {backend} triplestore: {reason}")]
    Connection { backend: String, reason: String },

    /// Connecting took longer than allowed
    #[error("triplestore connection timed out after {0:?}")]
    Timeout(Duration),

    /// Operation on a closed connection
    #[error("triplestore connection is closed")]
    Closed,

    /// Store rejected a read or write
    #[error("triplestore error: {0}")]
    Store(String),
}

impl KbError {
    /// Create connection error for backend
    pub fn connection(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for knowledge-base operations
pub type KbResult<T> = Result<T, KbError>;

//! Error types for the generate step
//!
//! Provides error handling for:
//! - Selection policy and driver configuration
//! - Collection, label and datamodel lookup
//! - Persistence through storage drivers
//! - Provenance recording in the knowledge base

use ote_kb::KbError;
use ote_storage::{ResolveError, StorageError};

/// Main error type of the generate step
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Missing or conflicting configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Collection, label or datamodel does not exist
    #[error("{kind} not found: '{id}'")]
    NotFound { kind: &'static str, id: String },

    /// Mapping-driven construction produced no instance
    #[error("no instance of '{datamodel}' can be constructed from the collection")]
    NoMatch { datamodel: String },

    /// Media type has no driver
    #[error("unsupported media type: '{0}'")]
    UnsupportedMediaType(String),

    /// Driver or I/O failure while persisting
    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),

    /// Provenance requested without the settings it needs
    #[error("missing configuration '{key}': {hint}")]
    MissingConfiguration { key: String, hint: String },

    /// Knowledge graph contradicts what provenance recording expects
    #[error("inconsistent provenance for '{individual}': {reason}")]
    ProvenanceConsistency { individual: String, reason: String },

    /// Triplestore connection or query failure
    #[error("knowledge base error: {0}")]
    KnowledgeBase(#[from] KbError),
}

impl GenerateError {
    /// Create not-found error
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    /// Create error for a collection id that is already registered
    pub fn collection_exists(id: &str) -> Self {
        Self::Configuration(format!("collection '{id}' already exists"))
    }

    /// Create provenance consistency error
    pub fn inconsistent(individual: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProvenanceConsistency {
            individual: individual.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before any side effect
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::UnsupportedMediaType(_))
    }
}

impl From<ResolveError> for GenerateError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unspecified => Self::Configuration(err.to_string()),
            ResolveError::UnsupportedMediaType(media_type) => Self::UnsupportedMediaType(media_type),
        }
    }
}

/// Result type alias for the generate step
pub type GenerateResult<T> = Result<T, GenerateError>;

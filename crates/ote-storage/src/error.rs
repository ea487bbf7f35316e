//! Error types for the storage layer
//!
//! Provides error handling for:
//! - Driver resolution (media type → driver name)
//! - Driver options parsing
//! - Encoding/decoding and file I/O (egress and ingress)
//! - Data cache operations

use std::path::PathBuf;

/// Errors while resolving a driver name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Neither a driver nor a media type was given
    #[error("either `driver` or `mediaType` must be given")]
    Unspecified,

    /// Media type has no registered driver
    #[error("unsupported media type: '{0}'")]
    UnsupportedMediaType(String),
}

/// Errors during driver save/load
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No driver registered under this name
    #[error("no storage driver named '{0}'")]
    UnknownDriver(String),

    /// Malformed or unsupported driver option
    #[error("invalid driver option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// Location scheme the drivers cannot write to
    #[error("unsupported location: '{0}'")]
    UnsupportedLocation(String),

    /// Encoding through a driver failed
    #[error("{driver} driver failed to encode: {message}")]
    Encode { driver: String, message: String },

    /// Decoding through a driver failed
    #[error("{driver} driver failed to decode: {message}")]
    Decode { driver: String, message: String },

    /// Exclusive write mode and the location is taken
    #[error("location already exists: {0}")]
    AlreadyExists(PathBuf),

    /// IO error during read or write
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data cache rejected an operation
    #[error("cache error: {0}")]
    Cache(String),
}

impl StorageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create encode error for driver
    pub fn encode(driver: impl Into<String>, message: impl ToString) -> Self {
        Self::Encode {
            driver: driver.into(),
            message: message.to_string(),
        }
    }

    /// Create decode error for driver
    pub fn decode(driver: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            driver: driver.into(),
            message: message.to_string(),
        }
    }

    /// Create invalid option error
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::UnsupportedMediaType("image/png".to_string());
        assert_eq!(err.to_string(), "unsupported media type: 'image/png'");
    }

    #[test]
    fn storage_error_display() {
        let err = StorageError::UnknownDriver("hdf5".to_string());
        assert_eq!(err.to_string(), "no storage driver named 'hdf5'");

        let err = StorageError::encode("json", "boom");
        assert_eq!(err.to_string(), "json driver failed to encode: boom");
    }

    #[test]
    fn io_error_keeps_source() {
        let err = StorageError::io_error(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}

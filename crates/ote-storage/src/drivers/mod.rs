//! Storage drivers
//!
//! A driver turns a [`Document`] into bytes and back:
//! - `json` via serde_json
//! - `yaml` via serde_yaml
//! - `msgpack` via rmp-serde
//!
//! The [`DriverRegistry`] owns file I/O, so drivers stay pure and every
//! driver honours the same location and `mode` semantics.

use crate::document::Document;
use crate::error::{StorageError, StorageResult};
use crate::options::{DriverOptions, WriteMode};
use ote_instance::ContentHash;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

mod json;
mod msgpack;
mod yaml;

pub use json::JsonDriver;
pub use msgpack::MsgpackDriver;
pub use yaml::YamlDriver;

/// Serialization backend identified by name
///
/// Implement this trait to add support for new formats.
pub trait StorageDriver: Send + Sync + 'static {
    /// Name used in configuration (`driver: "json"`)
    fn name(&self) -> &str;

    /// Encode a document
    ///
    /// # Errors
    /// Returns [`StorageError::Encode`] if the document cannot be represented
    fn encode(&self, document: &Document, options: &DriverOptions) -> StorageResult<Vec<u8>>;

    /// Decode bytes produced by [`StorageDriver::encode`]
    ///
    /// # Errors
    /// Returns [`StorageError::Decode`] for malformed input
    fn decode(&self, bytes: &[u8]) -> StorageResult<Document>;
}

/// Outcome of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    /// Bytes written
    pub bytes: usize,
    /// Digest of the written bytes
    pub hash: ContentHash,
}

/// Registry of drivers by name
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn StorageDriver>>,
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}

impl DriverRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver, replacing any driver with the same name
    pub fn register<D: StorageDriver>(&mut self, driver: D) {
        self.drivers.insert(driver.name().to_string(), Arc::new(driver));
    }

    /// Find driver by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn StorageDriver>> {
        self.drivers.get(name).cloned()
    }

    /// Find driver by name or fail
    ///
    /// # Errors
    /// Returns [`StorageError::UnknownDriver`]
    pub fn require(&self, name: &str) -> StorageResult<Arc<dyn StorageDriver>> {
        self.get(name)
            .ok_or_else(|| StorageError::UnknownDriver(name.to_string()))
    }

    /// Registered driver names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Encode `document` with `driver` and write it to `location`
    ///
    /// `location` is a filesystem path or a `file://` URI. `mode=x` in the
    /// options refuses to replace an existing file.
    ///
    /// # Errors
    /// - [`StorageError::UnknownDriver`] if the driver is not registered
    /// - [`StorageError::UnsupportedLocation`] for non-file URIs
    /// - [`StorageError::AlreadyExists`] in exclusive mode
    /// - [`StorageError::Encode`] / [`StorageError::Io`] on failure
    pub async fn save(
        &self,
        driver: &str,
        document: &Document,
        location: &str,
        options: &DriverOptions,
    ) -> StorageResult<SaveReport> {
        let backend = self.require(driver)?;
        let path = location_path(location)?;
        let bytes = backend.encode(document, options)?;

        match options.mode()? {
            WriteMode::Overwrite => tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| StorageError::io_error(&path, e))?,
            WriteMode::Exclusive => {
                let mut file = tokio::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .await
                    .map_err(|e| match e.kind() {
                        std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.clone()),
                        _ => StorageError::io_error(&path, e),
                    })?;
                file.write_all(&bytes)
                    .await
                    .map_err(|e| StorageError::io_error(&path, e))?;
                file.flush()
                    .await
                    .map_err(|e| StorageError::io_error(&path, e))?;
            }
        }

        let report = SaveReport {
            bytes: bytes.len(),
            hash: ContentHash::compute(&bytes),
        };
        tracing::debug!(
            driver,
            path = %path.display(),
            bytes = report.bytes,
            hash = %report.hash.short(),
            "document saved"
        );
        Ok(report)
    }

    /// Read `location` and decode it with `driver`
    ///
    /// # Errors
    /// - [`StorageError::UnknownDriver`] if the driver is not registered
    /// - [`StorageError::Io`] / [`StorageError::Decode`] on failure
    pub async fn load(&self, driver: &str, location: &str) -> StorageResult<Document> {
        let backend = self.require(driver)?;
        let path = location_path(location)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::io_error(&path, e))?;
        backend.decode(&bytes)
    }
}

/// Create registry with the built-in drivers
#[inline]
#[must_use]
pub fn default_drivers() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register(JsonDriver);
    registry.register(YamlDriver);
    registry.register(MsgpackDriver);
    registry
}

fn location_path(location: &str) -> StorageResult<PathBuf> {
    if let Some(rest) = location.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    match location.split_once("://") {
        Some(_) => Err(StorageError::UnsupportedLocation(location.to_string())),
        None if location.is_empty() => Err(StorageError::UnsupportedLocation(location.to_string())),
        None => Ok(Path::new(location).to_path_buf()),
    }
}

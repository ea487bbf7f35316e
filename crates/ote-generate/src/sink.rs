//! Persistence sink
//!
//! Writes the selected artifact through a driver, either to an explicit
//! location or through a scoped temporary file into the data cache.

use crate::error::GenerateResult;
use ote_instance::ContentHash;
use ote_storage::{DataCache, Document, DriverOptions, DriverRegistry, StorageError};
use std::path::{Path, PathBuf};

/// Cache key used when no `accessKey` is configured
pub const DEFAULT_CACHE_KEY: &str = "generate_data";

/// Where the serialized artifact goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistTarget {
    Location(String),
    Cache { key: Option<String> },
}

impl PersistTarget {
    /// A location wins over a cache key
    #[must_use]
    pub fn new(location: Option<&str>, access_key: Option<&str>) -> Self {
        match location {
            Some(location) => Self::Location(location.to_string()),
            None => Self::Cache {
                key: access_key.map(str::to_string),
            },
        }
    }
}

/// What a persist call wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReceipt {
    pub target: PersistTarget,
    pub bytes: usize,
    pub hash: ContentHash,
    /// Key the bytes were cached under (cache branch only)
    pub cache_key: Option<String>,
}

/// Writes documents through drivers
pub struct PersistenceSink<'a> {
    drivers: &'a DriverRegistry,
    cache: &'a dyn DataCache,
    temp_root: Option<&'a Path>,
}

impl<'a> PersistenceSink<'a> {
    #[must_use]
    pub fn new(drivers: &'a DriverRegistry, cache: &'a dyn DataCache) -> Self {
        Self {
            drivers,
            cache,
            temp_root: None,
        }
    }

    /// Create temporary files under `root` instead of the system temp dir
    #[must_use]
    pub fn with_temp_root(mut self, root: Option<&'a Path>) -> Self {
        self.temp_root = root;
        self
    }

    /// Persist `document` through `driver`
    ///
    /// # Errors
    /// Returns [`GenerateError::Persistence`](crate::GenerateError::Persistence)
    /// for driver, I/O and cache failures
    pub async fn persist(
        &self,
        document: &Document,
        driver: &str,
        options: &DriverOptions,
        target: &PersistTarget,
    ) -> GenerateResult<PersistReceipt> {
        match target {
            PersistTarget::Location(location) => {
                let report = self.drivers.save(driver, document, location, options).await?;
                tracing::info!(driver, location = %location, bytes = report.bytes, "artifact written");
                Ok(PersistReceipt {
                    target: target.clone(),
                    bytes: report.bytes,
                    hash: report.hash,
                    cache_key: None,
                })
            }
            PersistTarget::Cache { key } => {
                let key = match key {
                    Some(key) => key.as_str(),
                    None => {
                        tracing::warn!(
                            key = DEFAULT_CACHE_KEY,
                            "no accessKey configured; unrelated runs sharing this cache will overwrite each other"
                        );
                        DEFAULT_CACHE_KEY
                    }
                };
                let bytes = self.encode_via_tempfile(document, driver, options).await?;
                let hash = ContentHash::compute(&bytes);
                let size = bytes.len();
                let cache_key = self.cache.add(bytes, Some(key)).await?;
                tracing::info!(driver, key = %cache_key, bytes = size, "artifact cached");
                Ok(PersistReceipt {
                    target: target.clone(),
                    bytes: size,
                    hash,
                    cache_key: Some(cache_key),
                })
            }
        }
    }

    async fn encode_via_tempfile(
        &self,
        document: &Document,
        driver: &str,
        options: &DriverOptions,
    ) -> Result<Vec<u8>, StorageError> {
        let root = self.temp_root.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let dir = tempfile::Builder::new()
            .prefix("ote-generate-")
            .tempdir_in(&root)
            .map_err(|e| StorageError::io_error(&root, e))?;
        let path: PathBuf = dir.path().join(format!("data.{driver}"));
        let location = path
            .to_str()
            .ok_or_else(|| StorageError::UnsupportedLocation(path.display().to_string()))?;

        self.drivers.save(driver, document, location, options).await?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::io_error(&path, e))?;
        // `dir` is removed here and on every early return above
        Ok(bytes)
    }
}

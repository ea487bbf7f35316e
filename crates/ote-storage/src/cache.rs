//! Data cache for persisted bytes
//!
//! When no output location is configured the pipeline hands the encoded
//! bytes to a [`DataCache`] and remembers the key. The default backend is
//! an in-process moka cache.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use moka::future::Cache;
use ote_instance::ContentHash;
use std::sync::Arc;
use std::time::Duration;

/// Keyed byte store
#[async_trait]
pub trait DataCache: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous entry
    ///
    /// Without a key the hex content hash of `bytes` is used.
    /// Returns the key the bytes were stored under.
    ///
    /// # Errors
    /// Returns [`StorageError::Cache`] if the backend rejects the write
    async fn add(&self, bytes: Vec<u8>, key: Option<&str>) -> StorageResult<String>;

    /// Fetch bytes previously stored under `key`
    async fn get(&self, key: &str) -> Option<Arc<Vec<u8>>>;
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// In-process data cache backed by moka
#[derive(Debug, Clone)]
pub struct MemoryDataCache {
    inner: Cache<String, Arc<Vec<u8>>>,
}

impl MemoryDataCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Check if an entry exists
    #[inline]
    #[must_use]
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.get(key).await.is_some()
    }

    /// Drop an entry
    #[inline]
    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for MemoryDataCache {
    /// Create cache with default capacity (1,000 entries)
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[async_trait]
impl DataCache for MemoryDataCache {
    async fn add(&self, bytes: Vec<u8>, key: Option<&str>) -> StorageResult<String> {
        let key = match key {
            Some(k) if k.trim().is_empty() => {
                return Err(StorageError::Cache("cache key must not be blank".to_string()))
            }
            Some(k) => k.to_string(),
            None => ContentHash::compute(&bytes).to_string(),
        };
        tracing::debug!(key = %key, bytes = bytes.len(), "data cache add");
        self.inner.insert(key.clone(), Arc::new(bytes)).await;
        Ok(key)
    }

    async fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.inner.get(key).await
    }
}

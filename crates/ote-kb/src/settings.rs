//! Connection settings and connectors

use crate::error::{KbError, KbResult};
use crate::store::{MemoryTriplestore, Triplestore};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Settings for opening a triplestore
///
/// Unknown keys are kept in `extras` and passed on to the connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriplestoreSettings {
    pub backend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_iri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl TriplestoreSettings {
    /// Settings for a backend with no further options
    #[must_use]
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            base_iri: None,
            database: None,
            extras: Map::new(),
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Interpret a JSON settings blob
    ///
    /// # Errors
    /// Returns [`KbError::InvalidSettings`] if the blob is not an object with
    /// a non-empty `backend`
    pub fn from_value(value: &Value) -> KbResult<Self> {
        let settings: Self = serde_json::from_value(value.clone())
            .map_err(|e| KbError::InvalidSettings(e.to_string()))?;
        if settings.backend.trim().is_empty() {
            return Err(KbError::InvalidSettings("`backend` must not be empty".to_string()));
        }
        Ok(settings)
    }
}

/// Opens triplestore handles from settings
#[async_trait]
pub trait TriplestoreConnector: Send + Sync {
    /// Open a new handle
    ///
    /// # Errors
    /// Returns [`KbError::UnsupportedBackend`] or [`KbError::Connection`]
    async fn connect(&self, settings: &TriplestoreSettings) -> KbResult<Arc<dyn Triplestore>>;
}

/// Connector for the `memory` backend
///
/// Each `database` name maps to one shared graph that outlives connections.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    databases: DashMap<String, MemoryTriplestore>,
}

impl MemoryConnector {
    /// Backend name served by this connector
    pub const BACKEND: &'static str = "memory";

    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph behind a database name, created on first use
    #[must_use]
    pub fn database(&self, name: &str) -> MemoryTriplestore {
        self.databases.entry(name.to_string()).or_default().clone()
    }
}

#[async_trait]
impl TriplestoreConnector for MemoryConnector {
    async fn connect(&self, settings: &TriplestoreSettings) -> KbResult<Arc<dyn Triplestore>> {
        if settings.backend != Self::BACKEND {
            return Err(KbError::UnsupportedBackend(settings.backend.clone()));
        }
        let name = settings.database.as_deref().unwrap_or("default");
        tracing::debug!(database = name, "opening memory triplestore");
        Ok(Arc::new(self.database(name).handle()))
    }
}

//! Pipeline orchestrator
//!
//! # Workflow
//! 1. Validate selection policy, driver and options (no side effects)
//! 2. Fetch the collection from the registry
//! 3. Select or construct the artifact
//! 4. Persist it to a location or the data cache, then register a copy
//! 5. Record provenance when `kb_document_iri` is set
//! 6. Publish the collection and return its id

use crate::config::{GenerateConfig, SelectionPolicy};
use crate::error::{GenerateError, GenerateResult};
use crate::provenance::{ProvenanceRecorder, ProvenanceRequest, DEFAULT_RESOURCE_MEDIA_TYPE};
use crate::registry::CollectionRegistry;
use crate::selector::{select, SelectedArtifact};
use crate::session::{Session, SessionUpdate, TRIPLESTORE_SETTINGS};
use crate::sink::{PersistTarget, PersistenceSink};
use ote_instance::DatamodelStore;
use ote_kb::{MemoryConnector, ResourceConfiguration, ResourceDescription, TriplestoreConnector};
use ote_storage::{default_drivers, resolve_driver, DataCache, DriverOptions, DriverRegistry, MemoryDataCache};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Tunables of a [`Generator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Upper bound on opening a triplestore connection
    pub connect_timeout: Duration,
    /// Directory for scoped temporary files; system temp dir if unset
    pub temp_dir: Option<PathBuf>,
    /// Capacity of the default in-memory data cache
    pub cache_capacity: u64,
}

impl GeneratorOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            temp_dir: None,
            cache_capacity: 1_000,
        }
    }
}

/// The generate step
///
/// Owns or shares the collaborators every invocation needs.
pub struct Generator {
    registry: Arc<CollectionRegistry>,
    datamodels: Arc<DatamodelStore>,
    drivers: DriverRegistry,
    cache: Arc<dyn DataCache>,
    connector: Arc<dyn TriplestoreConnector>,
    options: GeneratorOptions,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("collections", &self.registry.len())
            .field("datamodels", &self.datamodels.len())
            .field("drivers", &self.drivers)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// Generator with in-memory collaborators
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            registry: Arc::new(CollectionRegistry::new()),
            datamodels: Arc::new(DatamodelStore::new()),
            drivers: default_drivers(),
            cache: Arc::new(MemoryDataCache::new(options.cache_capacity)),
            connector: Arc::new(MemoryConnector::new()),
            options,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<CollectionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_datamodels(mut self, datamodels: Arc<DatamodelStore>) -> Self {
        self.datamodels = datamodels;
        self
    }

    #[must_use]
    pub fn with_drivers(mut self, drivers: DriverRegistry) -> Self {
        self.drivers = drivers;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn DataCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn TriplestoreConnector>) -> Self {
        self.connector = connector;
        self
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<CollectionRegistry> {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn datamodels(&self) -> &Arc<DatamodelStore> {
        &self.datamodels
    }

    #[inline]
    #[must_use]
    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn DataCache> {
        &self.cache
    }

    /// Bind the session to its collection, creating it if needed
    ///
    /// # Errors
    /// Returns [`GenerateError::NotFound`] for an unregistered `collection_id`
    pub fn initialize(&self, config: &GenerateConfig, session: &Session) -> GenerateResult<SessionUpdate> {
        let collection = self.registry.get_collection(session, config.collection_id())?;
        let collection_id = self.registry.update_collection(&collection);
        tracing::debug!(collection = %collection_id, "generate step initialized");
        Ok(SessionUpdate { collection_id })
    }

    /// Run the generate step
    ///
    /// Returns the id of the source collection. Configuration problems are
    /// reported before anything is written; a provenance failure is reported
    /// after the artifact has been persisted and does not undo it.
    ///
    /// # Errors
    /// See [`GenerateError`]
    pub async fn generate(&self, config: &GenerateConfig, session: &Session) -> GenerateResult<SessionUpdate> {
        let policy = SelectionPolicy::from_config(config)?;
        let driver = resolve_driver(config.driver.as_deref(), config.media_type.as_deref())?;
        self.drivers.require(&driver)?;
        let options = DriverOptions::from_optional(config.options.as_deref())
            .map_err(|e| GenerateError::Configuration(e.to_string()))?;
        if let SelectionPolicy::Collection { new_id: Some(new_id) } = &policy {
            if self.registry.contains(new_id) {
                return Err(GenerateError::collection_exists(new_id));
            }
        }
        tracing::info!(?policy, driver = %driver, "generate step started");

        let collection = self.registry.get_collection(session, config.collection_id())?;
        let selected = select(&collection, &policy, &self.datamodels)?;

        let target = PersistTarget::new(config.location(), config.access_key());
        let sink = PersistenceSink::new(&self.drivers, self.cache.as_ref())
            .with_temp_root(self.options.temp_dir.as_deref());
        let receipt = sink
            .persist(&selected.to_document(), &driver, &options, &target)
            .await?;
        tracing::debug!(bytes = receipt.bytes, hash = %receipt.hash.short(), "artifact persisted");

        if let (SelectionPolicy::Collection { new_id: Some(_) }, SelectedArtifact::Collection(copy)) =
            (&policy, &selected)
        {
            self.registry.insert_new(copy.clone())?;
            tracing::info!(copy = copy.id(), "registered collection copy");
        }

        if let Some(subject) = config.kb_document_iri() {
            let snapshot = collection.read().clone();
            let request = ProvenanceRequest {
                subject,
                resource: ResourceDescription {
                    download_url: config.location().map(str::to_string),
                    media_type: Some(
                        config
                            .media_type
                            .clone()
                            .filter(|m| !m.trim().is_empty())
                            .unwrap_or_else(|| DEFAULT_RESOURCE_MEDIA_TYPE.to_string()),
                    ),
                    configuration: ResourceConfiguration {
                        metadata: Some(
                            config
                                .datamodel
                                .clone()
                                .filter(|m| !m.trim().is_empty())
                                .unwrap_or_else(|| selected.meta().to_string()),
                        ),
                        driver: Some(driver.clone()),
                        options: options.raw().map(str::to_string),
                    },
                },
                context: &config.kb_document_context,
                computation: config.kb_document_computation(),
            };
            ProvenanceRecorder::new(self.connector.as_ref(), self.options.connect_timeout)
                .record(session.settings(TRIPLESTORE_SETTINGS), &request, &snapshot)
                .await?;
        }

        let collection_id = self.registry.update_collection(&collection);
        tracing::info!(collection = %collection_id, "generate step finished");
        Ok(SessionUpdate { collection_id })
    }
}

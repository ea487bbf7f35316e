//! Collection registry
//!
//! Maps collection ids to live shared collections. The registry is an
//! explicit object owned by the [`Generator`](crate::Generator) and shared
//! with other steps by `Arc`.

use crate::error::{GenerateError, GenerateResult};
use crate::session::Session;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ote_instance::{Collection, SharedCollection};
use std::sync::Arc;

/// Registry of shared collections by id
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: DashMap<String, SharedCollection>,
}

impl CollectionRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection, replacing any collection with the same id
    pub fn insert(&self, collection: Collection) -> SharedCollection {
        let id = collection.id().to_string();
        let shared = collection.into_shared();
        self.collections.insert(id, Arc::clone(&shared));
        shared
    }

    /// Register a collection under an id nobody holds yet
    ///
    /// # Errors
    /// Returns [`GenerateError::Configuration`] if the id is taken; the
    /// registered collection is left untouched
    pub fn insert_new(&self, collection: Collection) -> GenerateResult<SharedCollection> {
        match self.collections.entry(collection.id().to_string()) {
            Entry::Occupied(entry) => Err(GenerateError::collection_exists(entry.key())),
            Entry::Vacant(entry) => {
                let shared = collection.into_shared();
                entry.insert(Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedCollection> {
        self.collections.get(id).map(|c| Arc::clone(c.value()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.collections.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Collection for this invocation
    ///
    /// An explicit `id` must be registered. Without one, the session's
    /// collection is used, created on first reference; a session without a
    /// collection id gets a fresh collection.
    ///
    /// # Errors
    /// Returns [`GenerateError::NotFound`] for an unregistered explicit id
    pub fn get_collection(&self, session: &Session, id: Option<&str>) -> GenerateResult<SharedCollection> {
        if let Some(id) = id {
            return self
                .get(id)
                .ok_or_else(|| GenerateError::not_found("collection", id));
        }

        let collection = match session.collection_id() {
            Some(id) => {
                let entry = self.collections.entry(id.to_string()).or_try_insert_with(|| {
                    tracing::debug!(collection = id, "creating session collection");
                    Collection::with_id(id)
                        .map(Collection::into_shared)
                        .map_err(|e| GenerateError::Configuration(e.to_string()))
                })?;
                Arc::clone(entry.value())
            }
            None => {
                let collection = Collection::new();
                tracing::debug!(collection = collection.id(), "creating collection for session");
                self.insert(collection)
            }
        };
        Ok(collection)
    }

    /// Publish a collection so later steps observe its current state
    ///
    /// Returns the collection id.
    pub fn update_collection(&self, collection: &SharedCollection) -> String {
        let id = collection.read().id().to_string();
        self.collections.insert(id.clone(), Arc::clone(collection));
        id
    }
}

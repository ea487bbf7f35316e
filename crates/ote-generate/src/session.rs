//! Session state shared between pipeline steps

use crate::error::{GenerateError, GenerateResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session key holding the active collection id
pub const COLLECTION_ID_KEY: &str = "collection_id";

/// Session key holding named settings blobs
pub const SETTINGS_KEY: &str = "settings";

/// Settings name for triplestore connection settings
pub const TRIPLESTORE_SETTINGS: &str = "tripper.triplestore";

/// Key-value context passed through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Map<String, Value>);

impl Session {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session from a JSON object
    ///
    /// # Errors
    /// Returns [`GenerateError::Configuration`] if `value` is not an object
    pub fn from_value(value: Value) -> GenerateResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(GenerateError::Configuration(format!(
                "session must be a JSON object, got {other}"
            ))),
        }
    }

    /// Session bound to a collection
    #[must_use]
    pub fn with_collection_id(mut self, id: impl Into<String>) -> Self {
        self.set_collection_id(id);
        self
    }

    /// Session carrying a named settings blob
    #[must_use]
    pub fn with_settings(mut self, name: impl Into<String>, settings: Value) -> Self {
        self.insert_settings(name, settings);
        self
    }

    #[must_use]
    pub fn collection_id(&self) -> Option<&str> {
        self.0
            .get(COLLECTION_ID_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
    }

    pub fn set_collection_id(&mut self, id: impl Into<String>) {
        self.0.insert(COLLECTION_ID_KEY.to_string(), Value::String(id.into()));
    }

    /// Named settings blob
    #[must_use]
    pub fn settings(&self, name: &str) -> Option<&Value> {
        self.0
            .get(SETTINGS_KEY)
            .and_then(Value::as_object)
            .and_then(|settings| settings.get(name))
    }

    pub fn insert_settings(&mut self, name: impl Into<String>, settings: Value) {
        let entry = self
            .0
            .entry(SETTINGS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(name.into(), settings);
        }
    }

    /// Raw value under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Merge an update returned by a step
    pub fn apply(&mut self, update: &SessionUpdate) {
        self.set_collection_id(update.collection_id.clone());
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Session changes produced by a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub collection_id: String,
}

//! Typed instances
//!
//! An [`Instance`] is a record of dimension sizes and property values that
//! conforms to a datamodel identified by URI. Instances are plain values:
//! sharing happens at the collection level.

use crate::datamodel::Datamodel;
use crate::hash::{ContentHash, HashError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors related to instances, datamodels and collections
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// Collection or instance identifier is unusable
    #[error("invalid identifier: '{0}'")]
    InvalidId(String),

    /// Datamodel violates a structural invariant
    #[error("invalid datamodel {uri}: {reason}")]
    InvalidDatamodel { uri: String, reason: String },

    /// Instance does not conform to its datamodel
    #[error("instance {uuid} does not conform to {meta}: {reason}")]
    Nonconforming {
        uuid: String,
        meta: String,
        reason: String,
    },

    /// Label already used in the collection
    #[error("label already present in collection: '{0}'")]
    DuplicateLabel(String),

    /// Content hashing failed
    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}

/// Typed, dimensioned record conforming to a datamodel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    uuid: String,
    meta: String,
    #[serde(default)]
    dimensions: IndexMap<String, usize>,
    #[serde(default)]
    properties: IndexMap<String, Value>,
}

impl Instance {
    /// Create an empty instance of datamodel `meta` with a fresh uuid
    #[must_use]
    pub fn new(meta: impl Into<String>) -> Self {
        Self::with_uuid(uuid::Uuid::new_v4().to_string(), meta)
    }

    /// Create an empty instance with an explicit uuid
    #[must_use]
    pub fn with_uuid(uuid: impl Into<String>, meta: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            meta: meta.into(),
            dimensions: IndexMap::new(),
            properties: IndexMap::new(),
        }
    }

    /// Builder form of [`Instance::set_dimension`]
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, size: usize) -> Self {
        self.set_dimension(name, size);
        self
    }

    /// Builder form of [`Instance::set_property`]
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set_property(name, value);
        self
    }

    /// Instance uuid
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// URI of the datamodel this instance conforms to
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &str {
        &self.meta
    }

    /// Set a dimension size
    pub fn set_dimension(&mut self, name: impl Into<String>, size: usize) {
        self.dimensions.insert(name.into(), size);
    }

    /// Size of a dimension
    #[inline]
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<usize> {
        self.dimensions.get(name).copied()
    }

    /// All dimensions in declaration order
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> &IndexMap<String, usize> {
        &self.dimensions
    }

    /// Set a property value
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Property value
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// All properties in insertion order
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Digest of the instance content (meta, dimensions, properties)
    ///
    /// The uuid is excluded, so two instances with identical content but
    /// different identity share a digest.
    ///
    /// # Errors
    /// Returns error if a property value cannot be encoded
    pub fn digest(&self) -> Result<ContentHash, InstanceError> {
        let hash = ContentHash::compute_serializable(&(
            &self.meta,
            &self.dimensions,
            &self.properties,
        ))?;
        Ok(hash)
    }

    /// Check this instance against its datamodel
    ///
    /// Properties missing from the instance are allowed (incomplete
    /// instances are produced by tolerant mapping). Present properties must
    /// be declared, shaped dimensions must be set, and array values must
    /// match the dimension sizes.
    ///
    /// # Errors
    /// Returns [`InstanceError::Nonconforming`] on the first violation
    pub fn conforms_to(&self, model: &Datamodel) -> Result<(), InstanceError> {
        if model.uri != self.meta {
            return Err(self.nonconforming(&model.uri, format!("meta is {}", self.meta)));
        }
        for (name, value) in &self.properties {
            let Some(prop) = model.property(name) else {
                return Err(self.nonconforming(&model.uri, format!("undeclared property '{name}'")));
            };
            let mut sizes = Vec::with_capacity(prop.shape.len());
            for dim in &prop.shape {
                match self.dimension(dim) {
                    Some(n) => sizes.push(n),
                    None => {
                        return Err(self.nonconforming(&model.uri, format!("dimension '{dim}' not set")))
                    }
                }
            }
            if !shape_matches(value, &sizes) {
                return Err(self.nonconforming(
                    &model.uri,
                    format!("property '{name}' does not have shape {sizes:?}"),
                ));
            }
        }
        Ok(())
    }

    fn nonconforming(&self, meta: &str, reason: String) -> InstanceError {
        InstanceError::Nonconforming {
            uuid: self.uuid.clone(),
            meta: meta.to_string(),
            reason,
        }
    }
}

/// Nested-array extents of a JSON value, outermost first
///
/// Follows the first element at each level; ragged arrays are caught by
/// [`shape_matches`].
#[must_use]
pub fn value_extents(value: &Value) -> Vec<usize> {
    let mut extents = Vec::new();
    let mut current = value;
    while let Value::Array(items) = current {
        extents.push(items.len());
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    extents
}

fn shape_matches(value: &Value, sizes: &[usize]) -> bool {
    match sizes.split_first() {
        None => !value.is_array(),
        Some((&n, rest)) => match value {
            Value::Array(items) => items.len() == n && items.iter().all(|v| shape_matches(v, rest)),
            _ => false,
        },
    }
}

//! Datamodels (metadata schemas) and the datamodel store
//!
//! A [`Datamodel`] is identified by a URI of the form
//! `<namespace>/<version>/<name>` and declares named dimensions and typed,
//! dimensioned properties. Instances refer to their datamodel by URI only.

use crate::instance::InstanceError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Named dimension of a datamodel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Typed property of a datamodel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Element type name (`float64`, `int32`, `string`, ...)
    #[serde(rename = "type")]
    pub type_name: String,
    /// Dimension names, outermost first. Empty for scalars.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shape: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Property {
    /// Scalar property
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            shape: Vec::new(),
            unit: None,
            description: String::new(),
        }
    }

    /// Set the property shape
    #[must_use]
    pub fn with_shape<I, S>(mut self, shape: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shape = shape.into_iter().map(Into::into).collect();
        self
    }

    /// Set the property unit
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Metadata schema that typed instances conform to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datamodel {
    pub uri: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Datamodel {
    /// Create an empty datamodel
    ///
    /// # Errors
    /// Returns [`InstanceError::InvalidDatamodel`] if the URI is not
    /// `namespace/version/name`-shaped
    pub fn new(uri: impl Into<String>) -> Result<Self, InstanceError> {
        let uri = uri.into();
        check_uri(&uri)?;
        Ok(Self {
            uri,
            description: String::new(),
            dimensions: Vec::new(),
            properties: Vec::new(),
        })
    }

    /// Add a dimension
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.dimensions.push(Dimension {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    /// Add a property
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Look up a property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// IRI of a property (`<uri>#<name>`), used as mapping subject
    #[inline]
    #[must_use]
    pub fn property_iri(&self, name: &str) -> String {
        property_iri(&self.uri, name)
    }

    /// Check structural invariants
    ///
    /// - URI is well formed
    /// - dimension and property names are unique
    /// - every shape entry names a declared dimension
    ///
    /// # Errors
    /// Returns [`InstanceError::InvalidDatamodel`] describing the first violation
    pub fn validate(&self) -> Result<(), InstanceError> {
        check_uri(&self.uri)?;

        let mut dims = HashSet::new();
        for dim in &self.dimensions {
            if !dims.insert(dim.name.as_str()) {
                return Err(self.invalid(format!("duplicate dimension '{}'", dim.name)));
            }
        }

        let mut names = HashSet::new();
        for prop in &self.properties {
            if !names.insert(prop.name.as_str()) {
                return Err(self.invalid(format!("duplicate property '{}'", prop.name)));
            }
            if let Some(missing) = prop.shape.iter().find(|d| !dims.contains(d.as_str())) {
                return Err(self.invalid(format!(
                    "property '{}' uses undeclared dimension '{missing}'",
                    prop.name
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> InstanceError {
        InstanceError::InvalidDatamodel {
            uri: self.uri.clone(),
            reason,
        }
    }
}

/// IRI of property `name` in datamodel `uri`
#[inline]
#[must_use]
pub fn property_iri(uri: &str, name: &str) -> String {
    format!("{uri}#{name}")
}

fn check_uri(uri: &str) -> Result<(), InstanceError> {
    let trimmed = uri.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.split('/').filter(|s| !s.is_empty()).count() < 3 {
        return Err(InstanceError::InvalidDatamodel {
            uri: uri.to_string(),
            reason: "expected '<namespace>/<version>/<name>'".to_string(),
        });
    }
    Ok(())
}

/// Registry of known datamodels keyed by URI
#[derive(Debug, Default)]
pub struct DatamodelStore {
    models: DashMap<String, Arc<Datamodel>>,
}

impl DatamodelStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a datamodel, replacing any previous one with the
    /// same URI
    ///
    /// # Errors
    /// Returns error if the datamodel fails [`Datamodel::validate`]
    pub fn register(&self, model: Datamodel) -> Result<Arc<Datamodel>, InstanceError> {
        model.validate()?;
        let model = Arc::new(model);
        self.models.insert(model.uri.clone(), Arc::clone(&model));
        Ok(model)
    }

    /// Look up a datamodel
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Arc<Datamodel>> {
        self.models.get(uri).map(|m| Arc::clone(m.value()))
    }

    /// Check whether a datamodel is known
    #[inline]
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.models.contains_key(uri)
    }

    /// Number of registered datamodels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

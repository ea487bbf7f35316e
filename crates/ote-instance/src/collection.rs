//! Collections of labelled instances and relations
//!
//! A [`Collection`] holds instances under unique labels plus a set of
//! (subject, predicate, object) relations. Relations carry the property
//! mappings used by [`Collection::instances_from_mappings`].
//!
//! Pipeline steps share a collection through [`SharedCollection`].

use crate::datamodel::Datamodel;
use crate::instance::{Instance, InstanceError};
use crate::mapping::MappingIter;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// URI of the datamodel describing collections themselves
pub const COLLECTION_META_URI: &str = "http://onto-ns.com/meta/0.1/Collection";

/// Collection shared by reference across pipeline steps
pub type SharedCollection = Arc<RwLock<Collection>>;

/// A (subject, predicate, object) relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub s: String,
    pub p: String,
    pub o: String,
}

impl Relation {
    /// Create relation
    #[must_use]
    pub fn new(s: impl Into<String>, p: impl Into<String>, o: impl Into<String>) -> Self {
        Self {
            s: s.into(),
            p: p.into(),
            o: o.into(),
        }
    }

    fn matches(&self, s: Option<&str>, p: Option<&str>, o: Option<&str>) -> bool {
        s.map_or(true, |s| self.s == s)
            && p.map_or(true, |p| self.p == p)
            && o.map_or(true, |o| self.o == o)
    }
}

/// Identifier-keyed container of labelled instances and relations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    uuid: String,
    #[serde(default)]
    instances: IndexMap<String, Instance>,
    #[serde(default)]
    relations: Vec<Relation>,
}

impl Collection {
    /// Create an empty collection with a fresh uuid
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            instances: IndexMap::new(),
            relations: Vec::new(),
        }
    }

    /// Create an empty collection with an explicit id
    ///
    /// # Errors
    /// Returns [`InstanceError::InvalidId`] for blank ids
    pub fn with_id(id: impl Into<String>) -> Result<Self, InstanceError> {
        let id = id.into();
        check_id(&id)?;
        Ok(Self {
            uuid: id,
            instances: IndexMap::new(),
            relations: Vec::new(),
        })
    }

    /// Collection identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.uuid
    }

    /// Move into a shared handle
    #[inline]
    #[must_use]
    pub fn into_shared(self) -> SharedCollection {
        Arc::new(RwLock::new(self))
    }

    /// Add an instance under `label`
    ///
    /// # Errors
    /// Returns [`InstanceError::DuplicateLabel`] if the label is taken
    pub fn add(&mut self, label: impl Into<String>, instance: Instance) -> Result<(), InstanceError> {
        let label = label.into();
        if self.instances.contains_key(&label) {
            return Err(InstanceError::DuplicateLabel(label));
        }
        self.instances.insert(label, instance);
        Ok(())
    }

    /// Instance stored under `label`
    #[inline]
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Instance> {
        self.instances.get(label)
    }

    /// Remove and return the instance under `label`
    pub fn remove(&mut self, label: &str) -> Option<Instance> {
        self.instances.shift_remove(label)
    }

    /// Labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    /// Labelled instances in insertion order
    pub fn instances(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.instances.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Instances conforming to datamodel `meta`
    pub fn instances_of<'a>(&'a self, meta: &'a str) -> impl Iterator<Item = (&'a str, &'a Instance)> + 'a {
        self.instances().filter(move |(_, inst)| inst.meta() == meta)
    }

    /// Number of instances
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the collection holds no instances
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Add a relation; identical relations are stored once
    pub fn add_relation(&mut self, s: impl Into<String>, p: impl Into<String>, o: impl Into<String>) {
        let relation = Relation::new(s, p, o);
        if !self.relations.contains(&relation) {
            self.relations.push(relation);
        }
    }

    /// All relations in insertion order
    #[inline]
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations matching the given pattern (`None` is a wildcard)
    pub fn find_relations<'a>(
        &'a self,
        s: Option<&'a str>,
        p: Option<&'a str>,
        o: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations.iter().filter(move |r| r.matches(s, p, o))
    }

    /// Deep copy under a new identity
    ///
    /// # Errors
    /// Returns [`InstanceError::InvalidId`] for blank ids
    pub fn copy(&self, new_id: impl Into<String>) -> Result<Self, InstanceError> {
        let new_id = new_id.into();
        check_id(&new_id)?;
        Ok(Self {
            uuid: new_id,
            instances: self.instances.clone(),
            relations: self.relations.clone(),
        })
    }

    /// Lazily construct instances of `target` from the collection's
    /// property mappings
    ///
    /// Each call returns a fresh iterator starting from the first candidate.
    /// With `allow_incomplete`, target properties without a mapped source are
    /// left unset instead of making the sequence empty.
    #[must_use]
    pub fn instances_from_mappings<'a>(&'a self, target: &'a Datamodel, allow_incomplete: bool) -> MappingIter<'a> {
        MappingIter::new(self, target, allow_incomplete)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

fn check_id(id: &str) -> Result<(), InstanceError> {
    if id.trim().is_empty() {
        return Err(InstanceError::InvalidId(id.to_string()));
    }
    Ok(())
}

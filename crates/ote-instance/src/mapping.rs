//! Mapping-driven instance construction
//!
//! Property mappings are relations `(<meta>#<property>, mapsTo, <concept>)`.
//! A target property is served by every collection instance whose own
//! datamodel property maps to the same concept. [`MappingIter`] walks the
//! combinations of sources in odometer order (last property varies fastest)
//! and builds one candidate instance per combination, on demand.

use crate::collection::Collection;
use crate::datamodel::{property_iri, Datamodel};
use crate::instance::{value_extents, Instance};
use std::collections::HashMap;

/// Predicate relating a datamodel property to an ontology concept
pub const MAPS_TO: &str = "http://emmo.info/domain-mappings#mapsTo";

/// One place a target property can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSource {
    /// Label of the source instance in the collection
    pub label: String,
    /// Property name on the source instance
    pub property: String,
}

#[derive(Debug)]
struct Slot {
    property: String,
    sources: Vec<MappingSource>,
}

/// Lazy sequence of instances constructed from property mappings
#[derive(Debug)]
pub struct MappingIter<'a> {
    collection: &'a Collection,
    target: &'a Datamodel,
    slots: Vec<Slot>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl<'a> MappingIter<'a> {
    pub(crate) fn new(collection: &'a Collection, target: &'a Datamodel, allow_incomplete: bool) -> Self {
        let concepts: HashMap<&str, &str> = collection
            .find_relations(None, Some(MAPS_TO), None)
            .map(|r| (r.s.as_str(), r.o.as_str()))
            .collect();

        let mut slots = Vec::with_capacity(target.properties.len());
        let mut missing = Vec::new();
        for prop in &target.properties {
            let sources = concepts
                .get(target.property_iri(&prop.name).as_str())
                .map(|concept| sources_for(collection, &concepts, concept))
                .unwrap_or_default();
            if sources.is_empty() {
                missing.push(prop.name.as_str());
            } else {
                slots.push(Slot {
                    property: prop.name.clone(),
                    sources,
                });
            }
        }

        let exhausted = slots.is_empty() || (!missing.is_empty() && !allow_incomplete);
        tracing::debug!(
            datamodel = %target.uri,
            mapped = slots.len(),
            ?missing,
            allow_incomplete,
            exhausted,
            "prepared mapping sources"
        );

        let cursor = vec![0; slots.len()];
        Self {
            collection,
            target,
            slots,
            cursor,
            exhausted,
        }
    }

    /// Sources for each mapped target property
    pub fn sources(&self) -> impl Iterator<Item = (&str, &[MappingSource])> {
        self.slots
            .iter()
            .map(|s| (s.property.as_str(), s.sources.as_slice()))
    }

    fn build(&self) -> Instance {
        let mut instance = Instance::new(self.target.uri.clone());
        for (slot, &idx) in self.slots.iter().zip(&self.cursor) {
            let source = &slot.sources[idx];
            if let Some(value) = self
                .collection
                .get(&source.label)
                .and_then(|inst| inst.property(&source.property))
            {
                instance.set_property(slot.property.clone(), value.clone());
            }
        }
        infer_dimensions(self.target, &mut instance);
        instance
    }

    fn advance(&mut self) {
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.slots[pos].sources.len() {
                return;
            }
            self.cursor[pos] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for MappingIter<'_> {
    type Item = Instance;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let instance = self.build();
        self.advance();
        Some(instance)
    }
}

fn sources_for(collection: &Collection, concepts: &HashMap<&str, &str>, concept: &str) -> Vec<MappingSource> {
    let mut sources = Vec::new();
    for (label, inst) in collection.instances() {
        for name in inst.properties().keys() {
            let iri = property_iri(inst.meta(), name);
            if concepts.get(iri.as_str()) == Some(&concept) {
                sources.push(MappingSource {
                    label: label.to_string(),
                    property: name.clone(),
                });
            }
        }
    }
    sources
}

/// Set target dimensions from the extents of the mapped values; the first
/// property using a dimension decides its size
fn infer_dimensions(target: &Datamodel, instance: &mut Instance) {
    for prop in &target.properties {
        let Some(value) = instance.property(&prop.name) else {
            continue;
        };
        let extents = value_extents(value);
        for (dim, size) in prop.shape.iter().zip(extents) {
            if instance.dimension(dim).is_none() {
                instance.set_dimension(dim.clone(), size);
            }
        }
    }
}

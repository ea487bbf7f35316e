//! Testing utilities for OTE workspace
//!
//! Shared fixtures: the Image datamodel, collections that hold it, a pair
//! of datamodels linked through property mappings, and triplestore settings.

#![allow(missing_docs)]

use ote_instance::{Collection, Datamodel, DatamodelStore, Instance, Property, MAPS_TO};
use ote_kb::{ResourceConfiguration, ResourceDescription, Restriction, RestrictionKind, Term, Triple};
use serde_json::{json, Value};

pub const IMAGE_META: &str = "http://onto-ns.com/meta/1.0/Image";
pub const SENSOR_META: &str = "http://onto-ns.com/meta/1.0/Sensor";
pub const READING_META: &str = "http://onto-ns.com/meta/1.0/Reading";
pub const TEMPERATURE_CONCEPT: &str = "http://emmo.info/emmo#ThermodynamicTemperature";

pub fn image_datamodel() -> Datamodel {
    Datamodel::new(IMAGE_META)
        .unwrap()
        .with_dimension("height", "Number of pixel rows")
        .with_dimension("width", "Number of pixel columns")
        .with_property(Property::new("data", "float64").with_shape(["height", "width"]))
        .with_property(Property::new("name", "string"))
}

pub fn image_instance() -> Instance {
    Instance::with_uuid("4b6a4ee2-0d2c-4d83-a0c9-0d6a5d0a3c11", IMAGE_META)
        .with_dimension("height", 2)
        .with_dimension("width", 3)
        .with_property("data", json!([[0.0, 0.5, 1.0], [1.0, 0.5, 0.0]]))
        .with_property("name", json!("gradient"))
}

/// Collection with the image instance under label `image`
pub fn image_collection() -> Collection {
    let mut coll = Collection::with_id("0e0f2b7a-6a2e-4c57-8f3b-64f1c0a2d9e1").unwrap();
    coll.add("image", image_instance()).unwrap();
    coll
}

pub fn sensor_datamodel() -> Datamodel {
    Datamodel::new(SENSOR_META)
        .unwrap()
        .with_property(Property::new("temp", "float64").with_unit("K"))
}

pub fn reading_datamodel() -> Datamodel {
    Datamodel::new(READING_META)
        .unwrap()
        .with_property(Property::new("temperature", "float64").with_unit("K"))
}

/// Store with every fixture datamodel registered
pub fn datamodel_store() -> DatamodelStore {
    let store = DatamodelStore::new();
    for model in [image_datamodel(), sensor_datamodel(), reading_datamodel()] {
        store.register(model).unwrap();
    }
    store
}

/// Collection whose sensor instance can be mapped onto a `Reading`
pub fn mapped_collection() -> Collection {
    let mut coll = image_collection();
    coll.add(
        "sensor",
        Instance::with_uuid("sensor-1", SENSOR_META).with_property("temp", json!(293.15)),
    )
    .unwrap();
    coll.add_relation(format!("{SENSOR_META}#temp"), MAPS_TO, TEMPERATURE_CONCEPT);
    coll.add_relation(format!("{READING_META}#temperature"), MAPS_TO, TEMPERATURE_CONCEPT);
    coll
}

/// Settings blob for the in-memory triplestore
pub fn memory_settings(database: &str) -> Value {
    json!({ "backend": "memory", "database": database })
}

/// Triples declaring `computation` with one `hasInput` restriction per input,
/// each input documented as a data resource of the given metadata
pub fn computation_triples(computation: &str, inputs: &[(&str, Option<&str>)]) -> Vec<Triple> {
    let mut triples = Vec::new();
    for (individual, metadata) in inputs {
        let restriction = Restriction::new(ote_kb::vocab::HAS_INPUT, RestrictionKind::Some, Term::iri(*individual));
        triples.extend(restriction.to_triples(computation));
        let description = ResourceDescription {
            download_url: Some(format!("file:///data/{}.json", individual.rsplit('/').next().unwrap_or("input"))),
            media_type: Some("application/json".to_string()),
            configuration: ResourceConfiguration {
                metadata: metadata.map(str::to_string),
                driver: Some("json".to_string()),
                options: None,
            },
        };
        triples.extend(description.to_triples(individual));
    }
    triples
}

//! OTE Instance System
//!
//! Typed instances, datamodels and shared collections.
//!
//! # Core Concepts
//!
//! - [`Datamodel`]: metadata schema identified by URI
//! - [`Instance`]: dimensioned record conforming to a datamodel
//! - [`Collection`]: labelled instances plus relation triples
//! - [`SharedCollection`]: collection shared across pipeline steps
//! - [`MappingIter`]: lazy construction of instances from property mappings
//! - [`ContentHash`]: Blake3 digest for content comparison
//!
//! # Example
//!
//! ```rust,ignore
//! use ote_instance::{Collection, Instance};
//!
//! let mut coll = Collection::new();
//! coll.add("image", Instance::new("http://onto-ns.com/meta/1.0/Image"))?;
//! let copy = coll.copy("copy1")?;
//! assert_eq!(copy.get("image"), coll.get("image"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod collection;
mod datamodel;
mod hash;
mod instance;
mod mapping;

// Re-exports
pub use collection::{Collection, Relation, SharedCollection, COLLECTION_META_URI};
pub use datamodel::{property_iri, Datamodel, DatamodelStore, Dimension, Property};
pub use hash::{ContentHash, HashError};
pub use instance::{value_extents, Instance, InstanceError};
pub use mapping::{MappingIter, MappingSource, MAPS_TO};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

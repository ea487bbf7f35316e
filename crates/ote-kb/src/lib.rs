//! OTE Knowledge Base
//!
//! Minimal RDF layer used to document generated data.
//!
//! # Core Concepts
//!
//! - [`Term`] / [`Triple`]: RDF statements
//! - [`Triplestore`]: async store handle; [`MemoryTriplestore`] keeps triples in memory
//! - [`TriplestoreConnector`]: opens handles from [`TriplestoreSettings`]
//! - [`Connection`]: scoped handle, closed exactly once
//! - [`ResourceDescription`]: where a serialized instance lives and how to parse it
//! - [`restrictions`]: OWL restriction lookup (e.g. the inputs of a computation)

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod connection;
mod error;
mod resource;
mod restriction;
mod settings;
mod store;
mod term;
pub mod vocab;

// Re-exports
pub use connection::Connection;
pub use error::{KbError, KbResult};
pub use resource::{ResourceConfiguration, ResourceDescription};
pub use restriction::{restrictions, Restriction, RestrictionKind};
pub use settings::{MemoryConnector, TriplestoreConnector, TriplestoreSettings};
pub use store::{MemoryTriplestore, Triplestore};
pub use term::{Literal, Term, Triple, XSD};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

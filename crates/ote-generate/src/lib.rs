//! OTE Generate - instance resolution, persistence and provenance
//!
//! The generate step of a data pipeline:
//! - Selects an instance from a shared collection (by label, by datamodel
//!   through property mappings, or the whole collection)
//! - Serializes it through a storage driver to a location or the data cache
//! - Optionally documents the generated data in a knowledge base
//!
//! # Example
//!
//! ```rust,ignore
//! use ote_generate::{GenerateConfig, Generator, GeneratorOptions, Session};
//!
//! # async fn example() -> Result<(), ote_generate::GenerateError> {
//! let generator = Generator::new(GeneratorOptions::new());
//! generator.registry().insert(collection);
//!
//! let config = GenerateConfig::new()
//!     .with_label("image")
//!     .with_driver("json")
//!     .with_location("/tmp/out.json");
//! let session = Session::new().with_collection_id(collection_id);
//! let update = generator.generate(&config, &session).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod generate;
pub mod provenance;
pub mod registry;
pub mod selector;
pub mod session;
pub mod sink;

// Re-exports for convenience
pub use config::{CacheConfig, ContextValue, GenerateConfig, SelectionPolicy};
pub use error::{GenerateError, GenerateResult};
pub use generate::{Generator, GeneratorOptions};
pub use provenance::{ProvenanceRecorder, ProvenanceRequest, ProvenanceSummary, DEFAULT_RESOURCE_MEDIA_TYPE};
pub use registry::CollectionRegistry;
pub use selector::{select, SelectedArtifact};
pub use session::{Session, SessionUpdate, COLLECTION_ID_KEY, SETTINGS_KEY, TRIPLESTORE_SETTINGS};
pub use sink::{PersistReceipt, PersistTarget, PersistenceSink, DEFAULT_CACHE_KEY};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the generate step
    pub use crate::{GenerateConfig, GenerateError, Generator, GeneratorOptions, Session, SessionUpdate};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! OTE Storage Layer
//!
//! The boundary between in-memory instances and their external form.
//!
//! # Core Operations
//!
//! - **Resolve**: pick a driver from an explicit name or a media type
//! - **Save**: encode a [`Document`] with a driver and write it to a location
//! - **Load**: read a location back into a [`Document`]
//! - **Cache**: hand encoded bytes to a [`DataCache`] under an access key
//!
//! # Architecture
//!
//! ```text
//! Instance/Collection → Document → StorageDriver → bytes → File System
//!                                                    ↓
//!                                               DataCache (keyed)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ote_storage::prelude::*;
//!
//! let driver = resolve_driver(None, Some("application/json"))?;
//! let options = DriverOptions::parse("mode=w")?;
//! default_drivers()
//!     .save(&driver, &Document::from(instance), "out.json", &options)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod cache;
pub mod document;
pub mod drivers;
pub mod error;
pub mod media;
pub mod options;

// Re-exports for convenience
pub use cache::{CacheStats, DataCache, MemoryDataCache};
pub use document::Document;
pub use drivers::{default_drivers, DriverRegistry, SaveReport, StorageDriver};
pub use error::{ResolveError, StorageError, StorageResult};
pub use media::{driver_for_media_type, resolve_driver};
pub use options::{DriverOptions, WriteMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the storage layer
    pub use crate::cache::{DataCache, MemoryDataCache};
    pub use crate::document::Document;
    pub use crate::drivers::{default_drivers, DriverRegistry, StorageDriver};
    pub use crate::error::{ResolveError, StorageError};
    pub use crate::media::resolve_driver;
    pub use crate::options::DriverOptions;
}

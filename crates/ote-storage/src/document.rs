//! Serializable payload handed to storage drivers
//!
//! A [`Document`] is either a single instance or a whole collection. The
//! `kind` tag lets a reader tell them apart without knowing which was stored.

use ote_instance::{Collection, ContentHash, Instance, InstanceError, COLLECTION_META_URI};
use serde::{Deserialize, Serialize};

/// Instance or collection as written by a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Document {
    Instance(Instance),
    Collection(Collection),
}

impl Document {
    /// URI of the datamodel the document conforms to
    #[must_use]
    pub fn meta(&self) -> &str {
        match self {
            Self::Instance(inst) => inst.meta(),
            Self::Collection(_) => COLLECTION_META_URI,
        }
    }

    /// Identity of the stored instance or collection
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Instance(inst) => inst.uuid(),
            Self::Collection(coll) => coll.id(),
        }
    }

    /// Content digest of the document
    ///
    /// # Errors
    /// Returns error if the content cannot be encoded for hashing
    pub fn digest(&self) -> Result<ContentHash, InstanceError> {
        Ok(ContentHash::compute_serializable(self)?)
    }
}

impl From<Instance> for Document {
    fn from(inst: Instance) -> Self {
        Self::Instance(inst)
    }
}

impl From<Collection> for Document {
    fn from(coll: Collection) -> Self {
        Self::Collection(coll)
    }
}

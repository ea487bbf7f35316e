//! MessagePack storage driver
//!
//! Binary encoding via rmp-serde. Structs are written as maps so the
//! document stays self-describing.

use super::StorageDriver;
use crate::document::Document;
use crate::error::{StorageError, StorageResult};
use crate::options::DriverOptions;

/// MessagePack driver (`msgpack`)
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackDriver;

impl StorageDriver for MsgpackDriver {
    fn name(&self) -> &str {
        "msgpack"
    }

    fn encode(&self, document: &Document, _options: &DriverOptions) -> StorageResult<Vec<u8>> {
        rmp_serde::to_vec_named(document).map_err(|e| StorageError::encode("msgpack", e))
    }

    fn decode(&self, bytes: &[u8]) -> StorageResult<Document> {
        rmp_serde::from_slice(bytes).map_err(|e| StorageError::decode("msgpack", e))
    }
}

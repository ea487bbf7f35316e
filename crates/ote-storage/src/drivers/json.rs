//! JSON storage driver
//!
//! Uses serde_json. `indent=true` pretty-prints the output.

use super::StorageDriver;
use crate::document::Document;
use crate::error::{StorageError, StorageResult};
use crate::options::DriverOptions;

/// JSON driver (`json`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDriver;

impl StorageDriver for JsonDriver {
    fn name(&self) -> &str {
        "json"
    }

    fn encode(&self, document: &Document, options: &DriverOptions) -> StorageResult<Vec<u8>> {
        let encoded = if options.flag("indent").unwrap_or(false) {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        encoded.map_err(|e| StorageError::encode("json", e))
    }

    fn decode(&self, bytes: &[u8]) -> StorageResult<Document> {
        serde_json::from_slice(bytes).map_err(|e| StorageError::decode("json", e))
    }
}

//! YAML storage driver
//!
//! Uses serde_yaml.

use super::StorageDriver;
use crate::document::Document;
use crate::error::{StorageError, StorageResult};
use crate::options::DriverOptions;

/// YAML driver (`yaml`)
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDriver;

impl StorageDriver for YamlDriver {
    fn name(&self) -> &str {
        "yaml"
    }

    fn encode(&self, document: &Document, _options: &DriverOptions) -> StorageResult<Vec<u8>> {
        serde_yaml::to_string(document)
            .map(String::into_bytes)
            .map_err(|e| StorageError::encode("yaml", e))
    }

    fn decode(&self, bytes: &[u8]) -> StorageResult<Document> {
        serde_yaml::from_slice(bytes).map_err(|e| StorageError::decode("yaml", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ote_instance::Collection;

    #[test]
    fn collection_roundtrip() {
        let mut coll = Collection::with_id("c1").unwrap();
        coll.add_relation("s", "p", "o");
        let doc = Document::from(coll);
        let bytes = YamlDriver.encode(&doc, &DriverOptions::none()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("kind: collection"));
        assert_eq!(YamlDriver.decode(&bytes).unwrap(), doc);
    }
}

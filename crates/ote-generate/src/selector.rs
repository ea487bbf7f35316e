//! Instance selection

use crate::config::SelectionPolicy;
use crate::error::{GenerateError, GenerateResult};
use ote_instance::{Collection, DatamodelStore, Instance, SharedCollection};
use ote_storage::Document;

/// What the selector picked
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedArtifact {
    Instance(Instance),
    /// The source collection, or its copy under a new id
    Collection(Collection),
}

impl SelectedArtifact {
    /// Datamodel URI of the artifact
    #[must_use]
    pub fn meta(&self) -> &str {
        match self {
            Self::Instance(inst) => inst.meta(),
            Self::Collection(_) => ote_instance::COLLECTION_META_URI,
        }
    }

    /// Id of the instance or collection
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Instance(inst) => inst.uuid(),
            Self::Collection(coll) => coll.id(),
        }
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Instance(inst) => Document::Instance(inst.clone()),
            Self::Collection(coll) => Document::Collection(coll.clone()),
        }
    }
}

/// Pick the artifact `policy` asks for
///
/// Reads the collection without mutating it. A copy requested by
/// [`SelectionPolicy::Collection`] is returned, not registered.
///
/// # Errors
/// - [`GenerateError::NotFound`] for a missing label
/// - [`GenerateError::NoMatch`] if no instance can be constructed, including
///   when the datamodel is not registered
/// - [`GenerateError::Configuration`] for an invalid copy id
pub fn select(
    collection: &SharedCollection,
    policy: &SelectionPolicy,
    datamodels: &DatamodelStore,
) -> GenerateResult<SelectedArtifact> {
    let coll = collection.read();
    match policy {
        SelectionPolicy::Label(label) => {
            let instance = coll
                .get(label)
                .cloned()
                .ok_or_else(|| GenerateError::not_found("label", label.as_str()))?;
            tracing::debug!(label = %label, uuid = instance.uuid(), "selected instance by label");
            Ok(SelectedArtifact::Instance(instance))
        }
        SelectionPolicy::Datamodel { uri, allow_incomplete } => {
            let Some(model) = datamodels.get(uri) else {
                tracing::debug!(datamodel = %uri, "datamodel not registered");
                return Err(GenerateError::NoMatch { datamodel: uri.clone() });
            };
            let instance = coll
                .instances_from_mappings(&model, *allow_incomplete)
                .next()
                .ok_or_else(|| GenerateError::NoMatch {
                    datamodel: uri.clone(),
                })?;
            tracing::debug!(datamodel = %uri, uuid = instance.uuid(), "constructed instance from mappings");
            Ok(SelectedArtifact::Instance(instance))
        }
        SelectionPolicy::Collection { new_id: Some(new_id) } => {
            let copy = coll
                .copy(new_id.as_str())
                .map_err(|e| GenerateError::Configuration(e.to_string()))?;
            tracing::debug!(source = coll.id(), copy = new_id.as_str(), "copied collection");
            Ok(SelectedArtifact::Collection(copy))
        }
        SelectionPolicy::Collection { new_id: None } => Ok(SelectedArtifact::Collection(coll.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ote_test_utils::{datamodel_store, image_collection, image_instance, mapped_collection, READING_META};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn label_lookup() {
        let coll = image_collection().into_shared();
        let selected = select(&coll, &SelectionPolicy::Label("image".into()), &datamodel_store()).unwrap();
        assert_eq!(selected, SelectedArtifact::Instance(image_instance()));

        let err = select(&coll, &SelectionPolicy::Label("missing".into()), &datamodel_store()).unwrap_err();
        assert!(matches!(err, GenerateError::NotFound { kind: "label", .. }));
    }

    #[test]
    fn datamodel_construction() {
        let coll = mapped_collection().into_shared();
        let policy = SelectionPolicy::Datamodel {
            uri: READING_META.to_string(),
            allow_incomplete: false,
        };
        let SelectedArtifact::Instance(reading) = select(&coll, &policy, &datamodel_store()).unwrap() else {
            panic!("expected an instance");
        };
        assert_eq!(reading.meta(), READING_META);
        assert_eq!(reading.property("temperature"), Some(&json!(293.15)));
    }

    #[test]
    fn datamodel_without_mappings_is_no_match() {
        let coll = image_collection().into_shared();
        let policy = SelectionPolicy::Datamodel {
            uri: READING_META.to_string(),
            allow_incomplete: true,
        };
        let err = select(&coll, &policy, &datamodel_store()).unwrap_err();
        assert!(matches!(err, GenerateError::NoMatch { .. }));
    }

    #[test]
    fn unknown_datamodel_is_no_match() {
        let coll = image_collection().into_shared();
        let policy = SelectionPolicy::Datamodel {
            uri: "http://onto-ns.com/meta/1.0/Unknown".to_string(),
            allow_incomplete: false,
        };
        assert!(matches!(
            select(&coll, &policy, &datamodel_store()),
            Err(GenerateError::NoMatch { datamodel }) if datamodel == "http://onto-ns.com/meta/1.0/Unknown"
        ));
    }

    #[test]
    fn collection_copy_and_identity() {
        let source = image_collection();
        let coll = source.clone().into_shared();

        let copy = select(&coll, &SelectionPolicy::Collection { new_id: Some("copy1".into()) }, &datamodel_store()).unwrap();
        assert_eq!(copy.id(), "copy1");
        let SelectedArtifact::Collection(copy) = copy else {
            panic!("expected a collection");
        };
        assert_eq!(copy.get("image"), source.get("image"));

        let same = select(&coll, &SelectionPolicy::Collection { new_id: None }, &datamodel_store()).unwrap();
        assert_eq!(same, SelectedArtifact::Collection(source.clone()));
        assert_eq!(*coll.read(), source);
    }

    proptest! {
        #[test]
        fn label_selection_is_exact_and_pure(labels in prop::collection::btree_set("[a-z]{1,8}", 1..6)) {
            let mut coll = ote_instance::Collection::with_id("c").unwrap();
            for (i, label) in labels.iter().enumerate() {
                coll.add(label.clone(), ote_instance::Instance::with_uuid(format!("u{i}"), "http://x.org/meta/0.1/M")).unwrap();
            }
            let before = coll.clone();
            let shared = coll.into_shared();
            let store = DatamodelStore::new();
            for label in &labels {
                let picked = select(&shared, &SelectionPolicy::Label(label.clone()), &store).unwrap();
                let expected = before.get(label).cloned().map(SelectedArtifact::Instance);
                prop_assert_eq!(Some(&picked), expected.as_ref());
            }
            prop_assert_eq!(&*shared.read(), &before);
        }
    }
}

//! End-to-end scenarios for the generate step

use ote_generate::{
    ContextValue, GenerateConfig, GenerateError, Generator, GeneratorOptions, Session, DEFAULT_CACHE_KEY,
    TRIPLESTORE_SETTINGS,
};
use ote_kb::{vocab, MemoryConnector, ResourceDescription, Term, Triple};
use ote_storage::{
    default_drivers, DataCache, Document, DriverOptions, MemoryDataCache, StorageDriver, StorageError, StorageResult,
};
use ote_test_utils::{
    computation_triples, datamodel_store, image_collection, image_instance, mapped_collection, memory_settings,
    IMAGE_META, READING_META,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    generator: Generator,
    cache: Arc<MemoryDataCache>,
    connector: Arc<MemoryConnector>,
    scratch: TempDir,
    out: TempDir,
    collection_id: String,
}

impl Fixture {
    fn new() -> Self {
        Self::with_collection(image_collection())
    }

    fn with_collection(collection: ote_instance::Collection) -> Self {
        let cache = Arc::new(MemoryDataCache::default());
        let connector = Arc::new(MemoryConnector::new());
        let scratch = tempfile::tempdir().unwrap();
        let mut drivers = default_drivers();
        drivers.register(BrokenDriver);

        let generator = Generator::new(GeneratorOptions::new().with_temp_dir(scratch.path()))
            .with_datamodels(Arc::new(datamodel_store()))
            .with_drivers(drivers)
            .with_cache(Arc::clone(&cache) as Arc<dyn DataCache>)
            .with_connector(Arc::clone(&connector) as Arc<dyn ote_kb::TriplestoreConnector>);
        let collection_id = collection.id().to_string();
        generator.registry().insert(collection);

        Self {
            generator,
            cache,
            connector,
            scratch,
            out: tempfile::tempdir().unwrap(),
            collection_id,
        }
    }

    fn session(&self) -> Session {
        Session::new().with_collection_id(&self.collection_id)
    }

    fn output(&self, name: &str) -> String {
        self.out.path().join(name).display().to_string()
    }

    fn scratch_is_empty(&self) -> bool {
        is_empty_dir(self.scratch.path())
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

/// Driver whose encoder always fails
struct BrokenDriver;

impl StorageDriver for BrokenDriver {
    fn name(&self) -> &str {
        "broken"
    }

    fn encode(&self, _document: &Document, _options: &DriverOptions) -> StorageResult<Vec<u8>> {
        Err(StorageError::encode("broken", "encoder is broken"))
    }

    fn decode(&self, _bytes: &[u8]) -> StorageResult<Document> {
        Err(StorageError::decode("broken", "decoder is broken"))
    }
}

#[tokio::test]
async fn label_to_json_location() {
    let fx = Fixture::new();
    let location = fx.output("out.json");
    let config = GenerateConfig::new()
        .with_label("image")
        .with_driver("json")
        .with_location(&location);

    let update = fx.generator.generate(&config, &fx.session()).await.unwrap();

    assert_eq!(update.collection_id, fx.collection_id);
    let stored = default_drivers().load("json", &location).await.unwrap();
    assert_eq!(stored, Document::from(image_instance()));
    let registry_view = fx.generator.registry().get(&fx.collection_id).unwrap();
    assert_eq!(*registry_view.read(), image_collection());
}

#[tokio::test]
async fn missing_selection_policy_does_no_io() {
    let fx = Fixture::new();
    let location = fx.output("never.json");
    for config in [
        GenerateConfig::new().with_driver("json").with_location(&location),
        GenerateConfig::new().with_media_type("application/json"),
    ] {
        let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
        assert!(matches!(err, GenerateError::Configuration(_)), "{err}");
    }
    assert!(!Path::new(&location).exists());
    assert!(!fx.cache.contains(DEFAULT_CACHE_KEY).await);
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn conflicting_policies_are_rejected() {
    let fx = Fixture::new();
    let config = GenerateConfig::new()
        .with_label("image")
        .with_store_collection(None)
        .with_driver("json")
        .with_access_key("k");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::Configuration(_)));
    assert!(!fx.cache.contains("k").await);
}

#[tokio::test]
async fn location_and_cache_branches_write_identical_bytes() {
    let fx = Fixture::new();
    for driver in ["json", "yaml", "msgpack"] {
        let location = fx.output(&format!("image.{driver}"));
        let key = format!("image-{driver}");

        let to_file = GenerateConfig::new().with_label("image").with_driver(driver).with_location(&location);
        let to_cache = GenerateConfig::new().with_label("image").with_driver(driver).with_access_key(&key);
        fx.generator.generate(&to_file, &fx.session()).await.unwrap();
        fx.generator.generate(&to_cache, &fx.session()).await.unwrap();

        let cached = fx.cache.get(&key).await.unwrap();
        assert_eq!(cached.as_slice(), std::fs::read(&location).unwrap().as_slice(), "driver {driver}");
    }
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn cache_branch_uses_default_key() {
    let fx = Fixture::new();
    let config = GenerateConfig::new().with_label("image").with_media_type("application/json");
    fx.generator.generate(&config, &fx.session()).await.unwrap();

    let bytes = fx.cache.get(DEFAULT_CACHE_KEY).await.unwrap();
    let doc: Document = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc, Document::from(image_instance()));
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn tempfile_removed_when_driver_fails() {
    let fx = Fixture::new();
    let config = GenerateConfig::new().with_label("image").with_driver("broken").with_access_key("k");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();

    assert!(matches!(err, GenerateError::Persistence(StorageError::Encode { .. })));
    assert!(!fx.cache.contains("k").await);
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn unknown_driver_detected_before_side_effects() {
    let fx = Fixture::new();
    let location = fx.output("out.h5");
    let config = GenerateConfig::new().with_label("image").with_driver("hdf5").with_location(&location);
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::Persistence(StorageError::UnknownDriver(_))));
    assert!(!Path::new(&location).exists());
}

#[tokio::test]
async fn unsupported_media_type() {
    let fx = Fixture::new();
    let config = GenerateConfig::new().with_label("image").with_media_type("image/png");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::UnsupportedMediaType(m) if m == "image/png"));
}

#[tokio::test]
async fn missing_label_is_not_found() {
    let fx = Fixture::new();
    let config = GenerateConfig::new().with_label("missing").with_driver("json").with_access_key("k");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::NotFound { kind: "label", .. }));
    assert!(!fx.cache.contains("k").await);
}

#[tokio::test]
async fn unknown_collection_id_is_not_found() {
    let fx = Fixture::new();
    let config = GenerateConfig::new()
        .with_label("image")
        .with_driver("json")
        .with_collection_id("no-such-collection");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::NotFound { kind: "collection", .. }));
}

#[tokio::test]
async fn datamodel_without_match_never_touches_cache() {
    let fx = Fixture::new();
    let config = GenerateConfig::new()
        .with_datamodel(READING_META, false)
        .with_media_type("application/json")
        .with_access_key("k1");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();

    assert!(matches!(err, GenerateError::NoMatch { datamodel } if datamodel == READING_META));
    assert!(fx.cache.get("k1").await.is_none());
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn datamodel_constructed_from_mappings() {
    let fx = Fixture::with_collection(mapped_collection());
    let config = GenerateConfig::new()
        .with_datamodel(READING_META, false)
        .with_media_type("application/yaml")
        .with_access_key("reading");
    fx.generator.generate(&config, &fx.session()).await.unwrap();

    let bytes = fx.cache.get("reading").await.unwrap();
    let Document::Instance(reading) = serde_yaml::from_slice::<Document>(&bytes).unwrap() else {
        panic!("expected an instance");
    };
    assert_eq!(reading.meta(), READING_META);
    assert_eq!(reading.property("temperature"), Some(&serde_json::json!(293.15)));
}

#[tokio::test]
async fn store_collection_copy() {
    let fx = Fixture::with_collection(mapped_collection());
    let config = GenerateConfig::new()
        .with_store_collection(Some("copy1"))
        .with_driver("json")
        .with_access_key("coll");
    let update = fx.generator.generate(&config, &fx.session()).await.unwrap();

    assert_eq!(update.collection_id, fx.collection_id);
    let source = fx.generator.registry().get(&fx.collection_id).unwrap();
    let copy = fx.generator.registry().get("copy1").unwrap();
    let (source, copy) = (source.read().clone(), copy.read().clone());
    assert_eq!(source, mapped_collection());
    assert_eq!(copy.id(), "copy1");
    assert_eq!(copy.instances().collect::<Vec<_>>(), source.instances().collect::<Vec<_>>());
    assert_eq!(copy.relations(), source.relations());
}

#[tokio::test]
async fn copy_onto_registered_id_is_rejected_before_writing() {
    let fx = Fixture::new();
    let config = GenerateConfig::new()
        .with_store_collection(Some(&fx.collection_id))
        .with_driver("json")
        .with_access_key("coll");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(fx.cache.get("coll").await.is_none());
    assert_eq!(fx.generator.registry().len(), 1);
}

#[tokio::test]
async fn failed_copy_persistence_leaves_id_free() {
    let fx = Fixture::with_collection(mapped_collection());
    let failing = GenerateConfig::new()
        .with_store_collection(Some("copy1"))
        .with_driver("json")
        .with_location(fx.output("missing/out.json"));
    let err = fx.generator.generate(&failing, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::Persistence(StorageError::Io { .. })));
    assert!(!fx.generator.registry().contains("copy1"));

    let retry = GenerateConfig::new()
        .with_store_collection(Some("copy1"))
        .with_driver("json")
        .with_access_key("coll");
    fx.generator.generate(&retry, &fx.session()).await.unwrap();
    assert!(fx.generator.registry().contains("copy1"));
    assert!(fx.cache.get("coll").await.is_some());
}

#[tokio::test]
async fn whole_collection_saved_with_write_mode() {
    let fx = Fixture::new();
    let location = fx.output("collection.json");
    std::fs::write(&location, b"stale").unwrap();
    let config = GenerateConfig::new()
        .with_store_collection(None)
        .with_driver("json")
        .with_options("mode=w")
        .with_location(&location);
    fx.generator.generate(&config, &fx.session()).await.unwrap();

    let stored = default_drivers().load("json", &location).await.unwrap();
    assert_eq!(stored, Document::from(image_collection()));
    assert_eq!(fx.generator.registry().len(), 1);
}

#[tokio::test]
async fn exclusive_mode_refuses_existing_location() {
    let fx = Fixture::new();
    let location = fx.output("taken.json");
    std::fs::write(&location, b"keep").unwrap();
    let config = GenerateConfig::new()
        .with_label("image")
        .with_driver("json")
        .with_options("mode=x")
        .with_location(&location);
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(matches!(err, GenerateError::Persistence(StorageError::AlreadyExists(_))));
    assert_eq!(std::fs::read(&location).unwrap(), b"keep");
}

#[tokio::test]
async fn invalid_options_are_configuration_errors() {
    let fx = Fixture::new();
    let config = GenerateConfig::new().with_label("image").with_driver("json").with_options("mode=a");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn provenance_without_settings_keeps_persisted_artifact() {
    let fx = Fixture::new();
    let location = fx.output("documented.json");
    let config = GenerateConfig::new()
        .with_label("image")
        .with_driver("json")
        .with_location(&location)
        .with_kb_document("http://example.org/kb/documented");
    let err = fx.generator.generate(&config, &fx.session()).await.unwrap_err();

    assert!(matches!(err, GenerateError::MissingConfiguration { .. }));
    assert!(Path::new(&location).exists());
    assert_eq!(
        default_drivers().load("json", &location).await.unwrap(),
        Document::from(image_instance())
    );
}

#[tokio::test]
async fn provenance_recorded_with_inputs() {
    let fx = Fixture::new();
    let subject = "http://example.org/kb/segmented";
    let computation = "http://example.org/kb/Segmentation";
    let store = fx.connector.database("kb");
    store.insert_all(computation_triples(computation, &[("http://example.org/kb/raw", Some(IMAGE_META))]));

    let location = fx.output("segmented.json");
    let config = GenerateConfig::new()
        .with_label("image")
        .with_driver("json")
        .with_options("mode=w")
        .with_location(&location)
        .with_kb_document(subject)
        .with_kb_context(
            "http://purl.org/dc/terms/creator",
            ContextValue::Iri {
                id: "https://orcid.org/0000-0002-1825-0097".to_string(),
            },
        )
        .with_kb_computation(computation);
    let session = fx.session().with_settings(TRIPLESTORE_SETTINGS, memory_settings("kb"));
    let update = fx.generator.generate(&config, &session).await.unwrap();
    assert_eq!(update.collection_id, fx.collection_id);

    let resource = ResourceDescription::load(&store, subject).await.unwrap().unwrap();
    assert_eq!(resource.download_url.as_deref(), Some(location.as_str()));
    assert_eq!(resource.media_type.as_deref(), Some("application/vnd.dlite-parse"));
    assert_eq!(resource.configuration.metadata.as_deref(), Some(IMAGE_META));
    assert_eq!(resource.configuration.driver.as_deref(), Some("json"));
    assert_eq!(resource.configuration.options.as_deref(), Some("mode=w"));

    let triples = store.snapshot();
    let s = Term::iri(subject);
    for expected in [
        Triple::new(s.clone(), "http://purl.org/dc/terms/creator", Term::iri("https://orcid.org/0000-0002-1825-0097")),
        Triple::new(s.clone(), vocab::PROV_WAS_GENERATED_BY, Term::iri(computation)),
        Triple::new(s.clone(), vocab::PROV_WAS_DERIVED_FROM, Term::iri("http://example.org/kb/raw")),
    ] {
        assert!(triples.contains(&expected), "missing {expected}");
    }
    assert_eq!(store.close_count(), 1);
}

#[tokio::test]
async fn provenance_inconsistency_after_persistence() {
    let fx = Fixture::new();
    let computation = "http://example.org/kb/Segmentation";
    fx.connector
        .database("kb")
        .insert_all(computation_triples(computation, &[("http://example.org/kb/raw", None)]));

    let config = GenerateConfig::new()
        .with_label("image")
        .with_driver("json")
        .with_access_key("seg")
        .with_kb_document("http://example.org/kb/segmented")
        .with_kb_computation(computation);
    let session = fx.session().with_settings(TRIPLESTORE_SETTINGS, memory_settings("kb"));
    let err = fx.generator.generate(&config, &session).await.unwrap_err();

    assert!(matches!(err, GenerateError::ProvenanceConsistency { .. }));
    assert!(fx.cache.contains("seg").await);
    assert_eq!(fx.connector.database("kb").close_count(), 1);
}

#[test]
fn initialize_binds_session_collection() {
    let fx = Fixture::new();
    let update = fx
        .generator
        .initialize(&GenerateConfig::new(), &Session::new().with_collection_id("fresh"))
        .unwrap();
    assert_eq!(update.collection_id, "fresh");
    assert!(fx.generator.registry().contains("fresh"));

    let update = fx.generator.initialize(&GenerateConfig::new(), &fx.session()).unwrap();
    assert_eq!(update.collection_id, fx.collection_id);
}

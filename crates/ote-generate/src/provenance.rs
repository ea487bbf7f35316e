//! Provenance recording
//!
//! Documents a generated artifact in the knowledge base: its resource
//! description, extra assertions from the configuration and, for a
//! computation, the input individuals it was derived from. All triples are
//! staged first and committed in one write, so a failed check leaves the
//! store untouched.

use crate::config::ContextValue;
use crate::error::{GenerateError, GenerateResult};
use crate::session::TRIPLESTORE_SETTINGS;
use indexmap::IndexMap;
use ote_instance::Collection;
use ote_kb::{
    restrictions, vocab, Connection, ResourceDescription, Term, Triple, TriplestoreConnector,
    TriplestoreSettings,
};
use serde_json::Value;
use std::time::Duration;

/// Media type recorded when none is configured
pub const DEFAULT_RESOURCE_MEDIA_TYPE: &str = "application/vnd.dlite-parse";

/// What to document
#[derive(Debug, Clone)]
pub struct ProvenanceRequest<'a> {
    pub subject: &'a str,
    pub resource: ResourceDescription,
    pub context: &'a IndexMap<String, ContextValue>,
    pub computation: Option<&'a str>,
}

/// What was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceSummary {
    pub subject: String,
    pub triples: usize,
    /// Input individuals of the computation
    pub inputs: Vec<String>,
}

/// Records generation events as triples
pub struct ProvenanceRecorder<'a> {
    connector: &'a dyn TriplestoreConnector,
    timeout: Duration,
}

impl<'a> ProvenanceRecorder<'a> {
    #[must_use]
    pub fn new(connector: &'a dyn TriplestoreConnector, timeout: Duration) -> Self {
        Self { connector, timeout }
    }

    /// Document the request in the store described by `settings`
    ///
    /// `collection` is the source collection; it is used to check that each
    /// input datamodel has at most one instance.
    ///
    /// # Errors
    /// - [`GenerateError::MissingConfiguration`] without settings
    /// - [`GenerateError::KnowledgeBase`] for connection and store failures
    /// - [`GenerateError::ProvenanceConsistency`] for undocumented or
    ///   ambiguous inputs
    pub async fn record(
        &self,
        settings: Option<&Value>,
        request: &ProvenanceRequest<'_>,
        collection: &Collection,
    ) -> GenerateResult<ProvenanceSummary> {
        let settings = settings.ok_or_else(|| GenerateError::MissingConfiguration {
            key: TRIPLESTORE_SETTINGS.to_string(),
            hint: "run a settings step (media type `application/vnd.dlite-settings`) that provides \
                   triplestore connection settings before generating with `kb_document_iri`"
                .to_string(),
        })?;
        let settings = TriplestoreSettings::from_value(settings)?;
        let conn = Connection::open(self.connector, &settings, self.timeout).await?;

        let outcome: GenerateResult<ProvenanceSummary> = async {
            let (batch, inputs) = stage(&conn, request, collection).await?;
            conn.add_triples(&batch).await?;
            Ok(ProvenanceSummary {
                subject: request.subject.to_string(),
                triples: batch.len(),
                inputs,
            })
        }
        .await;
        let closed = conn.close();

        let summary = outcome?;
        closed?;
        tracing::info!(
            subject = %summary.subject,
            triples = summary.triples,
            inputs = summary.inputs.len(),
            "provenance recorded"
        );
        Ok(summary)
    }
}

async fn stage(
    conn: &Connection,
    request: &ProvenanceRequest<'_>,
    collection: &Collection,
) -> GenerateResult<(Vec<Triple>, Vec<String>)> {
    let subject = Term::iri(request.subject);
    let mut batch = request.resource.to_triples(request.subject);
    batch.push(Triple::new(
        subject.clone(),
        vocab::PROV_GENERATED_AT_TIME,
        Term::typed(chrono::Utc::now().to_rfc3339(), vocab::XSD_DATE_TIME),
    ));

    for (predicate, value) in request.context {
        if predicate.trim().is_empty() {
            return Err(GenerateError::Configuration(
                "`kb_document_context` keys must be predicate IRIs".to_string(),
            ));
        }
        batch.push(Triple::new(subject.clone(), predicate.as_str(), value.to_term()));
    }

    let mut inputs = Vec::new();
    if let Some(computation) = request.computation {
        batch.push(Triple::new(
            subject.clone(),
            vocab::PROV_WAS_GENERATED_BY,
            Term::iri(computation),
        ));
        for restriction in restrictions(conn.store(), computation, vocab::HAS_INPUT).await? {
            let individual = restriction.value.value().to_string();
            let metadata = input_metadata(conn, &individual).await?;
            let count = collection.instances_of(&metadata).count();
            if count > 1 {
                return Err(GenerateError::inconsistent(
                    &individual,
                    format!("{count} instances of '{metadata}' in the collection; expected at most one"),
                ));
            }
            tracing::debug!(computation, input = %individual, metadata = %metadata, "computation input");
            batch.push(Triple::new(
                subject.clone(),
                vocab::PROV_WAS_DERIVED_FROM,
                restriction.value.clone(),
            ));
            inputs.push(individual);
        }
    }
    Ok((batch, inputs))
}

async fn input_metadata(conn: &Connection, individual: &str) -> GenerateResult<String> {
    let description = ResourceDescription::load(conn.store(), individual)
        .await?
        .ok_or_else(|| GenerateError::inconsistent(individual, "no resource description"))?;
    description
        .configuration
        .metadata
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| GenerateError::inconsistent(individual, "resource description has no metadata"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ote_kb::{MemoryConnector, ResourceConfiguration};
    use ote_test_utils::{computation_triples, image_collection, memory_settings, IMAGE_META};

    const SUBJECT: &str = "http://example.org/kb/out";
    const COMPUTATION: &str = "http://example.org/kb/Segmentation";

    fn resource() -> ResourceDescription {
        ResourceDescription {
            download_url: Some("/tmp/out.json".to_string()),
            media_type: Some(DEFAULT_RESOURCE_MEDIA_TYPE.to_string()),
            configuration: ResourceConfiguration {
                metadata: Some(IMAGE_META.to_string()),
                driver: Some("json".to_string()),
                options: None,
            },
        }
    }

    fn request<'a>(context: &'a IndexMap<String, ContextValue>, computation: Option<&'a str>) -> ProvenanceRequest<'a> {
        ProvenanceRequest {
            subject: SUBJECT,
            resource: resource(),
            context,
            computation,
        }
    }

    #[tokio::test]
    async fn missing_settings() {
        let connector = MemoryConnector::new();
        let recorder = ProvenanceRecorder::new(&connector, Duration::from_secs(1));
        let context = IndexMap::new();
        let err = recorder
            .record(None, &request(&context, None), &image_collection())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingConfiguration { key, .. } if key == TRIPLESTORE_SETTINGS));
    }

    #[tokio::test]
    async fn records_resource_and_context() {
        let connector = MemoryConnector::new();
        let recorder = ProvenanceRecorder::new(&connector, Duration::from_secs(1));
        let mut context = IndexMap::new();
        context.insert(
            "http://purl.org/dc/terms/title".to_string(),
            ContextValue::Text("Gradient".to_string()),
        );

        let summary = recorder
            .record(Some(&memory_settings("kb")), &request(&context, None), &image_collection())
            .await
            .unwrap();

        let store = connector.database("kb");
        assert_eq!(summary.triples, store.len());
        assert_eq!(store.close_count(), 1);
        let loaded = ResourceDescription::load(&store, SUBJECT).await.unwrap();
        assert_eq!(loaded, Some(resource()));
        assert!(store.snapshot().contains(&Triple::new(
            Term::iri(SUBJECT),
            "http://purl.org/dc/terms/title",
            Term::literal("Gradient"),
        )));
    }

    #[tokio::test]
    async fn computation_inputs_are_linked() {
        let connector = MemoryConnector::new();
        let store = connector.database("kb");
        store.insert_all(computation_triples(COMPUTATION, &[("http://example.org/kb/in1", Some(IMAGE_META))]));
        let before = store.len();

        let recorder = ProvenanceRecorder::new(&connector, Duration::from_secs(1));
        let context = IndexMap::new();
        let summary = recorder
            .record(Some(&memory_settings("kb")), &request(&context, Some(COMPUTATION)), &image_collection())
            .await
            .unwrap();

        assert_eq!(summary.inputs, vec!["http://example.org/kb/in1".to_string()]);
        assert_eq!(store.len(), before + summary.triples);
        let derived = store.snapshot().into_iter().filter(|t| t.predicate == vocab::PROV_WAS_DERIVED_FROM).count();
        assert_eq!(derived, 1);
    }

    #[tokio::test]
    async fn undocumented_input_writes_nothing_and_closes() {
        let connector = MemoryConnector::new();
        let store = connector.database("kb");
        store.insert_all(computation_triples(COMPUTATION, &[("http://example.org/kb/in1", None)]));
        let before = store.len();

        let recorder = ProvenanceRecorder::new(&connector, Duration::from_secs(1));
        let context = IndexMap::new();
        let err = recorder
            .record(Some(&memory_settings("kb")), &request(&context, Some(COMPUTATION)), &image_collection())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerateError::ProvenanceConsistency { individual, .. } if individual == "http://example.org/kb/in1"
        ));
        assert_eq!(store.len(), before);
        assert_eq!(store.close_count(), 1);
    }

    #[tokio::test]
    async fn ambiguous_input_is_rejected() {
        let connector = MemoryConnector::new();
        connector
            .database("kb")
            .insert_all(computation_triples(COMPUTATION, &[("http://example.org/kb/in1", Some(IMAGE_META))]));
        let mut coll = image_collection();
        coll.add("image2", ote_test_utils::image_instance()).unwrap();

        let recorder = ProvenanceRecorder::new(&connector, Duration::from_secs(1));
        let context = IndexMap::new();
        let err = recorder
            .record(Some(&memory_settings("kb")), &request(&context, Some(COMPUTATION)), &coll)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::ProvenanceConsistency { .. }));
    }

    #[tokio::test]
    async fn store_failure_still_closes() {
        let connector = MemoryConnector::new();
        let store = connector.database("kb");
        store.set_fail_writes(true);

        let recorder = ProvenanceRecorder::new(&connector, Duration::from_secs(1));
        let context = IndexMap::new();
        let err = recorder
            .record(Some(&memory_settings("kb")), &request(&context, None), &image_collection())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::KnowledgeBase(_)));
        assert_eq!(store.close_count(), 1);
    }
}

//! Data resource descriptions
//!
//! A resource description documents where a serialized instance lives and
//! how to read it back:
//!
//! ```text
//! <subject> a oteio:DataResource ;
//!     dcat:downloadURL "..."^^xsd:anyURI ;
//!     dcat:mediaType "..." ;
//!     oteio:hasConfiguration [
//!         oteio:metadata <datamodel> ;
//!         oteio:driver "json" ;
//!         oteio:options "mode=w"
//!     ] .
//! ```

use crate::error::KbResult;
use crate::store::Triplestore;
use crate::term::{Term, Triple};
use crate::vocab;
use serde::{Deserialize, Serialize};

/// How to parse the resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfiguration {
    /// Datamodel URI the resource conforms to
    pub metadata: Option<String>,
    pub driver: Option<String>,
    pub options: Option<String>,
}

/// Structured description of a data resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescription {
    pub download_url: Option<String>,
    pub media_type: Option<String>,
    pub configuration: ResourceConfiguration,
}

impl ResourceDescription {
    /// Triples describing the resource under `subject`
    #[must_use]
    pub fn to_triples(&self, subject: &str) -> Vec<Triple> {
        let subject = Term::iri(subject);
        let config = Term::fresh_blank();
        let mut triples = vec![Triple::new(
            subject.clone(),
            vocab::RDF_TYPE,
            Term::iri(vocab::OTEIO_DATA_RESOURCE),
        )];
        if let Some(url) = &self.download_url {
            triples.push(Triple::new(
                subject.clone(),
                vocab::DCAT_DOWNLOAD_URL,
                Term::typed(url, vocab::XSD_ANY_URI),
            ));
        }
        if let Some(media_type) = &self.media_type {
            triples.push(Triple::new(subject.clone(), vocab::DCAT_MEDIA_TYPE, Term::literal(media_type)));
        }
        triples.push(Triple::new(subject, vocab::OTEIO_HAS_CONFIGURATION, config.clone()));

        let cfg = &self.configuration;
        if let Some(metadata) = &cfg.metadata {
            triples.push(Triple::new(config.clone(), vocab::OTEIO_METADATA, Term::iri(metadata)));
        }
        if let Some(driver) = &cfg.driver {
            triples.push(Triple::new(config.clone(), vocab::OTEIO_DRIVER, Term::literal(driver)));
        }
        if let Some(options) = &cfg.options {
            triples.push(Triple::new(config, vocab::OTEIO_OPTIONS, Term::literal(options)));
        }
        triples
    }

    /// Read the description of `subject` back from a store
    ///
    /// Returns `None` when the store says nothing about `subject`.
    ///
    /// # Errors
    /// Propagates store read errors
    pub async fn load(store: &dyn Triplestore, subject: &str) -> KbResult<Option<Self>> {
        let subject = Term::iri(subject);
        if store.triples(Some(&subject), None, None).await?.is_empty() {
            return Ok(None);
        }

        let first = |terms: Vec<Term>| terms.into_iter().next().map(|t| t.value().to_string());
        let mut description = Self {
            download_url: first(store.objects(&subject, vocab::DCAT_DOWNLOAD_URL).await?),
            media_type: first(store.objects(&subject, vocab::DCAT_MEDIA_TYPE).await?),
            configuration: ResourceConfiguration::default(),
        };

        let config = store
            .objects(&subject, vocab::OTEIO_HAS_CONFIGURATION)
            .await?
            .into_iter()
            .find(Term::is_resource);
        if let Some(config) = config {
            description.configuration = ResourceConfiguration {
                metadata: first(store.objects(&config, vocab::OTEIO_METADATA).await?),
                driver: first(store.objects(&config, vocab::OTEIO_DRIVER).await?),
                options: first(store.objects(&config, vocab::OTEIO_OPTIONS).await?),
            };
        }
        Ok(Some(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTriplestore;
    use pretty_assertions::assert_eq;

    fn description() -> ResourceDescription {
        ResourceDescription {
            download_url: Some("file:///tmp/out.json".to_string()),
            media_type: Some("application/json".to_string()),
            configuration: ResourceConfiguration {
                metadata: Some("http://onto-ns.com/meta/1.0/Image".to_string()),
                driver: Some("json".to_string()),
                options: Some("mode=w".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MemoryTriplestore::new();
        store.insert_all(description().to_triples("http://ex.org/out"));
        let loaded = ResourceDescription::load(&store, "http://ex.org/out").await.unwrap();
        assert_eq!(loaded, Some(description()));
    }

    #[tokio::test]
    async fn unknown_subject() {
        let store = MemoryTriplestore::new();
        assert_eq!(ResourceDescription::load(&store, "http://ex.org/none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_description_has_no_metadata() {
        let store = MemoryTriplestore::new();
        let partial = ResourceDescription {
            download_url: Some("x.json".to_string()),
            ..ResourceDescription::default()
        };
        store.insert_all(partial.to_triples("http://ex.org/in"));
        let loaded = ResourceDescription::load(&store, "http://ex.org/in")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.configuration.metadata, None);
        assert_eq!(loaded.download_url.as_deref(), Some("x.json"));
    }
}

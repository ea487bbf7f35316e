//! Configuration of the generate step
//!
//! Field names follow the JSON configuration accepted by the pipeline
//! (`mediaType`, `cache_config.accessKey`, ...). Blank strings count as
//! absent.

use crate::error::{GenerateError, GenerateResult};
use indexmap::IndexMap;
use ote_kb::{Term, XSD};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Cache settings for the no-location branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key the serialized bytes are stored under
    #[serde(rename = "accessKey", default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

/// Object of an extra provenance assertion
///
/// `{"@id": ...}` is an IRI, `{"@value": ..., "@type"|"@language": ...}` a
/// literal. Bare strings that look like absolute IRIs become IRIs, other
/// strings plain literals; numbers and booleans become typed literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Iri {
        #[serde(rename = "@id")]
        id: String,
    },
    Literal {
        #[serde(rename = "@value")]
        value: String,
        #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(rename = "@language", default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
    Text(String),
    Number(Number),
    Bool(bool),
}

impl ContextValue {
    /// RDF object for this value
    #[must_use]
    pub fn to_term(&self) -> Term {
        match self {
            Self::Iri { id } => Term::iri(id),
            Self::Literal {
                value,
                lang: Some(lang),
                ..
            } => Term::lang(value, lang),
            Self::Literal {
                value,
                datatype: Some(datatype),
                ..
            } => Term::typed(value, datatype),
            Self::Literal { value, .. } => Term::literal(value),
            Self::Text(text) if looks_like_iri(text) => Term::iri(text),
            Self::Text(text) => Term::literal(text),
            Self::Number(n) if n.is_f64() => Term::typed(n.to_string(), format!("{XSD}double")),
            Self::Number(n) => Term::typed(n.to_string(), format!("{XSD}integer")),
            Self::Bool(b) => Term::typed(b.to_string(), format!("{XSD}boolean")),
        }
    }
}

fn looks_like_iri(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    match text.split_once(':') {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Configuration of one generate invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Driver name; takes precedence over `mediaType`
    pub driver: Option<String>,
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,
    /// Driver options as a `key=value` string, passed on verbatim
    pub options: Option<String>,
    /// Output location; without it the bytes go to the data cache
    pub location: Option<String>,
    pub label: Option<String>,
    pub datamodel: Option<String>,
    pub store_collection: bool,
    pub store_collection_id: Option<String>,
    pub allow_incomplete: bool,
    pub collection_id: Option<String>,
    #[serde(alias = "datacache_config")]
    pub cache_config: Option<CacheConfig>,
    pub kb_document_iri: Option<String>,
    pub kb_document_context: IndexMap<String, ContextValue>,
    pub kb_document_computation: Option<String>,
}

impl GenerateConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a JSON configuration object
    ///
    /// # Errors
    /// Returns [`GenerateError::Configuration`] if the value does not match
    pub fn from_value(value: Value) -> GenerateResult<Self> {
        serde_json::from_value(value).map_err(|e| GenerateError::Configuration(e.to_string()))
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_datamodel(mut self, uri: impl Into<String>, allow_incomplete: bool) -> Self {
        self.datamodel = Some(uri.into());
        self.allow_incomplete = allow_incomplete;
        self
    }

    /// Select the whole collection, optionally copied under `new_id`
    #[must_use]
    pub fn with_store_collection(mut self, new_id: Option<&str>) -> Self {
        self.store_collection = true;
        self.store_collection_id = new_id.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.cache_config = Some(CacheConfig {
            access_key: Some(key.into()),
        });
        self
    }

    #[must_use]
    pub fn with_collection_id(mut self, id: impl Into<String>) -> Self {
        self.collection_id = Some(id.into());
        self
    }

    /// Document the generated data under `iri`
    #[must_use]
    pub fn with_kb_document(mut self, iri: impl Into<String>) -> Self {
        self.kb_document_iri = Some(iri.into());
        self
    }

    #[must_use]
    pub fn with_kb_context(mut self, predicate: impl Into<String>, value: ContextValue) -> Self {
        self.kb_document_context.insert(predicate.into(), value);
        self
    }

    #[must_use]
    pub fn with_kb_computation(mut self, iri: impl Into<String>) -> Self {
        self.kb_document_computation = Some(iri.into());
        self
    }

    /// Cache key from `cache_config.accessKey`
    #[must_use]
    pub fn access_key(&self) -> Option<&str> {
        self.cache_config
            .as_ref()
            .and_then(|c| non_blank(c.access_key.as_ref()))
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_ref())
    }

    #[must_use]
    pub fn collection_id(&self) -> Option<&str> {
        non_blank(self.collection_id.as_ref())
    }

    #[must_use]
    pub fn kb_document_iri(&self) -> Option<&str> {
        non_blank(self.kb_document_iri.as_ref())
    }

    #[must_use]
    pub fn kb_document_computation(&self) -> Option<&str> {
        non_blank(self.kb_document_computation.as_ref())
    }
}

pub(crate) fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// What to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Instance stored under a label
    Label(String),
    /// First instance constructible from property mappings
    Datamodel { uri: String, allow_incomplete: bool },
    /// The collection itself, or a copy under a new id
    Collection { new_id: Option<String> },
}

impl SelectionPolicy {
    /// The single policy the configuration asks for
    ///
    /// # Errors
    /// Returns [`GenerateError::Configuration`] when none or more than one of
    /// `label`, `datamodel` and `store_collection` is set, or when
    /// `store_collection_id` is given without `store_collection`
    pub fn from_config(config: &GenerateConfig) -> GenerateResult<Self> {
        let label = non_blank(config.label.as_ref());
        let datamodel = non_blank(config.datamodel.as_ref());
        let new_id = non_blank(config.store_collection_id.as_ref());

        if new_id.is_some() && !config.store_collection {
            return Err(GenerateError::Configuration(
                "`store_collection_id` requires `store_collection`".to_string(),
            ));
        }

        match (label, datamodel, config.store_collection) {
            (Some(label), None, false) => Ok(Self::Label(label.to_string())),
            (None, Some(uri), false) => Ok(Self::Datamodel {
                uri: uri.to_string(),
                allow_incomplete: config.allow_incomplete,
            }),
            (None, None, true) => Ok(Self::Collection {
                new_id: new_id.map(str::to_string),
            }),
            (None, None, false) => Err(GenerateError::Configuration(
                "one of `label`, `datamodel` or `store_collection` must be given".to_string(),
            )),
            _ => Err(GenerateError::Configuration(
                "only one of `label`, `datamodel` or `store_collection` may be given".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_pipeline_field_names() {
        let config = GenerateConfig::from_value(json!({
            "mediaType": "application/json",
            "datamodel": "http://onto-ns.com/meta/1.0/Image",
            "allow_incomplete": true,
            "datacache_config": {"accessKey": "k1"},
            "kb_document_context": {
                "http://purl.org/dc/terms/creator": {"@id": "https://orcid.org/0000-0001"},
                "http://purl.org/dc/terms/title": "Gradient image"
            }
        }))
        .unwrap();
        assert_eq!(config.media_type.as_deref(), Some("application/json"));
        assert_eq!(config.access_key(), Some("k1"));
        assert!(config.allow_incomplete);
        assert_eq!(config.kb_document_context.len(), 2);
    }

    #[test]
    fn wrong_field_type_is_configuration_error() {
        let err = GenerateConfig::from_value(json!({"store_collection": "yes"})).unwrap_err();
        assert!(matches!(err, GenerateError::Configuration(_)));
    }

    #[test]
    fn exactly_one_policy() {
        let by_label = GenerateConfig::new().with_label("image");
        assert_eq!(
            SelectionPolicy::from_config(&by_label).unwrap(),
            SelectionPolicy::Label("image".to_string())
        );

        let copy = GenerateConfig::new().with_store_collection(Some("copy1"));
        assert_eq!(
            SelectionPolicy::from_config(&copy).unwrap(),
            SelectionPolicy::Collection {
                new_id: Some("copy1".to_string())
            }
        );

        let none = GenerateConfig::new().with_driver("json");
        assert!(matches!(
            SelectionPolicy::from_config(&none),
            Err(GenerateError::Configuration(_))
        ));

        let both = GenerateConfig::new()
            .with_label("image")
            .with_datamodel("http://onto-ns.com/meta/1.0/Image", false);
        assert!(matches!(
            SelectionPolicy::from_config(&both),
            Err(GenerateError::Configuration(_))
        ));
    }

    #[test]
    fn blank_label_counts_as_absent() {
        let config = GenerateConfig::new().with_label("  ");
        assert!(SelectionPolicy::from_config(&config).is_err());
    }

    #[test]
    fn copy_id_needs_store_collection() {
        let mut config = GenerateConfig::new().with_label("image");
        config.store_collection_id = Some("copy1".to_string());
        assert!(SelectionPolicy::from_config(&config).is_err());
    }

    #[test]
    fn context_values_to_terms() {
        let title: ContextValue = serde_json::from_value(json!("Gradient image")).unwrap();
        assert_eq!(title.to_term(), Term::literal("Gradient image"));

        let creator: ContextValue = serde_json::from_value(json!("https://orcid.org/0000-0001")).unwrap();
        assert_eq!(creator.to_term(), Term::iri("https://orcid.org/0000-0001"));

        let tagged: ContextValue = serde_json::from_value(json!({"@value": "Bild", "@language": "de"})).unwrap();
        assert_eq!(tagged.to_term(), Term::lang("Bild", "de"));

        let count: ContextValue = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(count.to_term(), Term::typed("3", format!("{XSD}integer")));

        let flag: ContextValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(flag.to_term(), Term::typed("true", format!("{XSD}boolean")));
    }

    #[test]
    fn iri_detection() {
        assert!(looks_like_iri("urn:uuid:1234"));
        assert!(looks_like_iri("http://example.org/x"));
        assert!(!looks_like_iri("a title: with spaces"));
        assert!(!looks_like_iri("plain"));
        assert!(!looks_like_iri("1:2"));
    }
}

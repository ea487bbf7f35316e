//! RDF terms and triples

use serde::{Deserialize, Serialize};
use std::fmt;

/// XML Schema datatype namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Literal value with optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// RDF node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Iri(String),
    Literal(Literal),
    Blank(String),
}

impl Term {
    #[inline]
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Plain string literal
    #[inline]
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal {
            value: value.into(),
            datatype: None,
            lang: None,
        })
    }

    /// Literal with a datatype IRI
    #[inline]
    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal(Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        })
    }

    /// Literal with a language tag
    #[inline]
    #[must_use]
    pub fn lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Literal(Literal {
            value: value.into(),
            datatype: None,
            lang: Some(lang.into()),
        })
    }

    /// Fresh blank node
    #[must_use]
    pub fn fresh_blank() -> Self {
        Self::Blank(format!("b{}", uuid::Uuid::new_v4().simple()))
    }

    /// IRI value, if this is an IRI
    #[inline]
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// IRI, literal lexical form or blank label
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Iri(v) | Self::Blank(v) => v,
            Self::Literal(lit) => &lit.value,
        }
    }

    /// True for IRIs and blank nodes, which can appear as subjects
    #[inline]
    #[must_use]
    pub fn is_resource(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Blank(id) => write!(f, "_:{id}"),
            Self::Literal(lit) => {
                write!(f, "\"{}\"", lit.value.replace('\\', "\\\\").replace('"', "\\\""))?;
                match (&lit.lang, &lit.datatype) {
                    (Some(lang), _) => write!(f, "@{lang}"),
                    (None, Some(dt)) => write!(f, "^^<{dt}>"),
                    (None, None) => Ok(()),
                }
            }
        }
    }
}

/// (subject, predicate, object) statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    #[inline]
    #[must_use]
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    /// Check the triple against an optional pattern
    #[must_use]
    pub fn matches(&self, s: Option<&Term>, p: Option<&str>, o: Option<&Term>) -> bool {
        s.map_or(true, |s| &self.subject == s)
            && p.map_or(true, |p| self.predicate == p)
            && o.map_or(true, |o| &self.object == o)
    }
}

/// N-Triples line
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

//! OWL restriction queries
//!
//! A class `C` with restriction `R` on property `P`:
//!
//! ```text
//! C rdfs:subClassOf _:r .
//! _:r a owl:Restriction ; owl:onProperty P ; owl:someValuesFrom V .
//! ```

use crate::error::KbResult;
use crate::store::Triplestore;
use crate::term::{Term, Triple};
use crate::vocab;

/// Restriction flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestrictionKind {
    Some,
    All,
    Value,
}

impl RestrictionKind {
    /// OWL predicate linking the restriction to its value
    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::Some => vocab::OWL_SOME_VALUES_FROM,
            Self::All => vocab::OWL_ALL_VALUES_FROM,
            Self::Value => vocab::OWL_HAS_VALUE,
        }
    }

    const ALL: [Self; 3] = [Self::Some, Self::All, Self::Value];
}

/// Restriction attached to a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub node: Term,
    pub property: String,
    pub kind: RestrictionKind,
    pub value: Term,
}

impl Restriction {
    /// New restriction with a fresh blank node
    #[must_use]
    pub fn new(property: impl Into<String>, kind: RestrictionKind, value: Term) -> Self {
        Self {
            node: Term::fresh_blank(),
            property: property.into(),
            kind,
            value,
        }
    }

    /// Triples attaching this restriction to `class`
    #[must_use]
    pub fn to_triples(&self, class: &str) -> Vec<Triple> {
        vec![
            Triple::new(Term::iri(class), vocab::RDFS_SUBCLASS_OF, self.node.clone()),
            Triple::new(self.node.clone(), vocab::RDF_TYPE, Term::iri(vocab::OWL_RESTRICTION)),
            Triple::new(self.node.clone(), vocab::OWL_ON_PROPERTY, Term::iri(&self.property)),
            Triple::new(self.node.clone(), self.kind.predicate(), self.value.clone()),
        ]
    }
}

/// Restrictions on `property` attached to `class`
///
/// # Errors
/// Propagates store read errors
pub async fn restrictions(
    store: &dyn Triplestore,
    class: &str,
    property: &str,
) -> KbResult<Vec<Restriction>> {
    let restriction_type = Term::iri(vocab::OWL_RESTRICTION);
    let on_property = Term::iri(property);
    let mut found = Vec::new();

    for node in store.objects(&Term::iri(class), vocab::RDFS_SUBCLASS_OF).await? {
        if !node.is_resource() {
            continue;
        }
        let types = store.objects(&node, vocab::RDF_TYPE).await?;
        if !types.contains(&restriction_type) {
            continue;
        }
        let properties = store.objects(&node, vocab::OWL_ON_PROPERTY).await?;
        if !properties.contains(&on_property) {
            continue;
        }
        for kind in RestrictionKind::ALL {
            for value in store.objects(&node, kind.predicate()).await? {
                found.push(Restriction {
                    node: node.clone(),
                    property: property.to_string(),
                    kind,
                    value,
                });
            }
        }
    }
    tracing::debug!(class, property, count = found.len(), "restriction query");
    Ok(found)
}

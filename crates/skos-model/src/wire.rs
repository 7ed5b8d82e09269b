//! GraphQL-shaped records
//!
//! The explorer's backend answers three fixed queries whose payloads share
//! one shape: `{uri, label, type: [{uri, label}], narrower?, broader?, ...}`
//! with literals encoded as `{string, lang}`. These records decode that
//! shape (nulls and missing fields both mean "empty") and convert into the
//! model, classifying each node on the way.

use serde::Deserialize;

use crate::node::{ConceptNode, ConceptSchemeNode, Literal, RdfNode, TypeRef};

/// `data` member of a query response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    /// Concept scheme listing
    #[serde(default)]
    pub concept_schemes: Option<Vec<WireScheme>>,
    /// Concept listing
    #[serde(default)]
    pub concepts: Option<Vec<WireConcept>>,
}

/// `{uri, label}` type reference
#[derive(Debug, Clone, Deserialize)]
pub struct WireType {
    /// Type URI
    pub uri: String,
    /// Type label
    #[serde(default)]
    pub label: Option<String>,
}

/// `{string, lang}` literal
#[derive(Debug, Clone, Deserialize)]
pub struct WireLiteral {
    /// Text
    #[serde(default)]
    pub string: String,
    /// Language tag
    #[serde(default)]
    pub lang: Option<String>,
}

/// Concept record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WireConcept {
    pub uri: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub types: Option<Vec<WireType>>,
    #[serde(default, rename = "__typename")]
    pub typename: Option<String>,
    #[serde(default)]
    pub narrower: Option<Vec<WireConcept>>,
    #[serde(default)]
    pub broader: Option<Vec<WireConcept>>,
    #[serde(default)]
    pub related: Option<Vec<WireConcept>>,
    #[serde(default)]
    pub definition: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub pref_label: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub alt_label: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub note: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub scope_note: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub example: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub editorial_note: Option<Vec<WireLiteral>>,
    #[serde(default)]
    pub source: Option<Vec<String>>,
    #[serde(default)]
    pub subject: Option<Vec<WireConcept>>,
}

/// Concept scheme record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WireScheme {
    pub uri: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub types: Option<Vec<WireType>>,
    #[serde(default, rename = "__typename")]
    pub typename: Option<String>,
    #[serde(default)]
    pub has_top_concept: Option<Vec<WireConcept>>,
    #[serde(default, rename = "aantalBegrippen", alias = "conceptCount")]
    pub concept_count: Option<u64>,
}

fn list<T>(value: Option<Vec<T>>) -> Vec<T> {
    value.unwrap_or_default()
}

fn convert<T, U: From<T>>(value: Option<Vec<T>>) -> Vec<U> {
    list(value).into_iter().map(U::from).collect()
}

fn rdf_node(
    uri: String,
    label: Option<String>,
    types: Option<Vec<WireType>>,
    typename: Option<&str>,
) -> RdfNode {
    RdfNode::classified(uri, label.unwrap_or_default(), convert(types), typename)
}

impl From<WireType> for TypeRef {
    fn from(value: WireType) -> Self {
        TypeRef::new(value.uri, value.label.unwrap_or_default())
    }
}

impl From<WireLiteral> for Literal {
    fn from(value: WireLiteral) -> Self {
        Literal {
            text: value.string,
            language: value.lang,
        }
    }
}

impl From<WireConcept> for ConceptNode {
    fn from(value: WireConcept) -> Self {
        let node = rdf_node(value.uri, value.label, value.types, value.typename.as_deref());

        ConceptNode {
            node,
            narrower: convert(value.narrower),
            broader: convert(value.broader),
            related: convert(value.related),
            definition: convert(value.definition),
            pref_label: convert(value.pref_label),
            alt_label: convert(value.alt_label),
            note: convert(value.note),
            scope_note: convert(value.scope_note),
            example: convert(value.example),
            editorial_note: convert(value.editorial_note),
            source: list(value.source),
            subject: list(value.subject)
                .into_iter()
                .map(|s| rdf_node(s.uri, s.label, s.types, s.typename.as_deref()))
                .collect(),
        }
    }
}

impl From<WireScheme> for ConceptSchemeNode {
    fn from(value: WireScheme) -> Self {
        ConceptSchemeNode {
            node: rdf_node(value.uri, value.label, value.types, value.typename.as_deref()),
            has_top_concept: convert(value.has_top_concept),
            concept_count: value.concept_count.unwrap_or(0),
        }
    }
}

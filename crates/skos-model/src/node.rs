//! Taxonomy nodes
//!
//! Every node carries a [`NodeKind`] computed once at construction from the
//! record's typename or its first RDF type. Routing elsewhere matches on the
//! kind and never re-inspects type labels.

use serde::Serialize;

use crate::uri::Uri;
use crate::SKOS_NS;

/// Node kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NodeKind {
    /// `skos:Concept`
    Concept,

    /// `skos:ConceptScheme`
    ConceptScheme,

    /// Anything else (collections, unclassified nodes)
    #[default]
    Other,
}

impl NodeKind {
    /// Classify from a GraphQL typename and the ordered RDF type list
    ///
    /// The typename wins when it is recognised. Otherwise the first type's
    /// label is checked, then its URI.
    #[must_use]
    pub fn classify(typename: Option<&str>, types: &[TypeRef]) -> Self {
        if let Some(kind) = typename.and_then(Self::from_name) {
            return kind;
        }

        let Some(first) = types.first() else {
            return Self::Other;
        };

        Self::from_name(first.label.trim())
            .or_else(|| {
                first
                    .uri
                    .as_str()
                    .strip_prefix(SKOS_NS)
                    .and_then(Self::from_name)
            })
            .unwrap_or(Self::Other)
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Concept" => Some(Self::Concept),
            "ConceptScheme" | "Concept Scheme" => Some(Self::ConceptScheme),
            _ => None,
        }
    }

    /// Check if this is a concept
    #[inline]
    #[must_use]
    pub fn is_concept(self) -> bool {
        self == Self::Concept
    }

    /// Check if this is a concept scheme
    #[inline]
    #[must_use]
    pub fn is_scheme(self) -> bool {
        self == Self::ConceptScheme
    }
}

/// Reference to an RDF type (`{uri, label}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    /// Type URI
    pub uri: Uri,
    /// Human-readable type label
    pub label: String,
}

impl TypeRef {
    /// Create type reference
    #[inline]
    #[must_use]
    pub fn new(uri: impl Into<Uri>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
        }
    }

    /// `skos:Concept`
    #[must_use]
    pub fn concept() -> Self {
        Self::new(format!("{SKOS_NS}Concept"), "Concept")
    }

    /// `skos:ConceptScheme`
    #[must_use]
    pub fn concept_scheme() -> Self {
        Self::new(format!("{SKOS_NS}ConceptScheme"), "Concept Scheme")
    }
}

/// Language-tagged literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Literal {
    /// Literal text
    pub text: String,
    /// BCP 47 language tag, if any
    pub language: Option<String>,
}

impl Literal {
    /// Create literal
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            text: text.into(),
            language: language.map(str::to_string),
        }
    }
}

/// Base entity shared by every taxonomy node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RdfNode {
    /// Primary key
    pub uri: Uri,
    /// Display label
    pub label: String,
    /// Ordered RDF types
    pub types: Vec<TypeRef>,
    kind: NodeKind,
}

impl RdfNode {
    /// Create node, classifying it from its types
    #[must_use]
    pub fn new(uri: impl Into<Uri>, label: impl Into<String>, types: Vec<TypeRef>) -> Self {
        Self::classified(uri, label, types, None)
    }

    /// Create node, classifying it from a typename and its types
    #[must_use]
    pub fn classified(
        uri: impl Into<Uri>,
        label: impl Into<String>,
        types: Vec<TypeRef>,
        typename: Option<&str>,
    ) -> Self {
        let kind = NodeKind::classify(typename, &types);
        Self {
            uri: uri.into(),
            label: label.into(),
            types,
            kind,
        }
    }

    /// Kind fixed at construction
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}

/// `skos:Concept` record
///
/// Relations may be partially loaded: a concept fetched as someone's child
/// carries only `{uri, label, type}` for its narrower entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptNode {
    /// Base entity
    pub node: RdfNode,
    /// Narrower concepts
    pub narrower: Vec<ConceptNode>,
    /// Broader concepts
    pub broader: Vec<ConceptNode>,
    /// Related concepts
    pub related: Vec<ConceptNode>,
    /// `skos:definition`
    pub definition: Vec<Literal>,
    /// `skos:prefLabel`
    pub pref_label: Vec<Literal>,
    /// `skos:altLabel`
    pub alt_label: Vec<Literal>,
    /// `skos:note`
    pub note: Vec<Literal>,
    /// `skos:scopeNote`
    pub scope_note: Vec<Literal>,
    /// `skos:example`
    pub example: Vec<Literal>,
    /// `skos:editorialNote`
    pub editorial_note: Vec<Literal>,
    /// `dct:source`
    pub source: Vec<String>,
    /// `dct:subject`
    pub subject: Vec<RdfNode>,
}

impl ConceptNode {
    /// Create a bare concept typed as `skos:Concept`
    #[must_use]
    pub fn new(uri: impl Into<Uri>, label: impl Into<String>) -> Self {
        Self::from_node(RdfNode::new(uri, label, vec![TypeRef::concept()]))
    }

    /// Wrap an existing base node with empty relations
    #[must_use]
    pub fn from_node(node: RdfNode) -> Self {
        Self {
            node,
            narrower: Vec::new(),
            broader: Vec::new(),
            related: Vec::new(),
            definition: Vec::new(),
            pref_label: Vec::new(),
            alt_label: Vec::new(),
            note: Vec::new(),
            scope_note: Vec::new(),
            example: Vec::new(),
            editorial_note: Vec::new(),
            source: Vec::new(),
            subject: Vec::new(),
        }
    }

    /// With narrower concepts
    #[inline]
    #[must_use]
    pub fn with_narrower(mut self, narrower: Vec<ConceptNode>) -> Self {
        self.narrower = narrower;
        self
    }

    /// With broader concepts
    #[inline]
    #[must_use]
    pub fn with_broader(mut self, broader: Vec<ConceptNode>) -> Self {
        self.broader = broader;
        self
    }

    /// With definitions
    #[inline]
    #[must_use]
    pub fn with_definition(mut self, definition: Vec<Literal>) -> Self {
        self.definition = definition;
        self
    }

    /// Node URI
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.node.uri
    }

    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    /// Copy without relations or annotations
    ///
    /// This is what the index stores for a concept seen only as somebody's
    /// child.
    #[must_use]
    pub fn summary(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

/// `skos:ConceptScheme` record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptSchemeNode {
    /// Base entity
    pub node: RdfNode,
    /// The scheme's roots
    pub has_top_concept: Vec<ConceptNode>,
    /// Number of concepts in the scheme (informational)
    pub concept_count: u64,
}

impl ConceptSchemeNode {
    /// Create a scheme typed as `skos:ConceptScheme`
    #[must_use]
    pub fn new(uri: impl Into<Uri>, label: impl Into<String>) -> Self {
        Self {
            node: RdfNode::new(uri, label, vec![TypeRef::concept_scheme()]),
            has_top_concept: Vec::new(),
            concept_count: 0,
        }
    }

    /// With top concepts
    #[inline]
    #[must_use]
    pub fn with_top_concepts(mut self, top: Vec<ConceptNode>) -> Self {
        self.has_top_concept = top;
        self
    }

    /// Node URI
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.node.uri
    }

    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }
}

/// Value stored by the node index for each URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum IndexedNode {
    /// Concept-shaped record
    Concept(ConceptNode),
    /// Scheme-shaped record
    Scheme(ConceptSchemeNode),
}

impl IndexedNode {
    /// Base entity
    #[must_use]
    pub fn rdf(&self) -> &RdfNode {
        match self {
            Self::Concept(c) => &c.node,
            Self::Scheme(s) => &s.node,
        }
    }

    /// Node URI
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.rdf().uri
    }

    /// Display label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        crate::uri::display_label(self.rdf())
    }

    /// Discriminator used for routing
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.rdf().kind()
    }

    /// Concept record, if concept-shaped
    #[must_use]
    pub fn as_concept(&self) -> Option<&ConceptNode> {
        match self {
            Self::Concept(c) => Some(c),
            Self::Scheme(_) => None,
        }
    }

    /// Scheme record, if scheme-shaped
    #[must_use]
    pub fn as_scheme(&self) -> Option<&ConceptSchemeNode> {
        match self {
            Self::Scheme(s) => Some(s),
            Self::Concept(_) => None,
        }
    }
}

impl From<ConceptNode> for IndexedNode {
    fn from(value: ConceptNode) -> Self {
        Self::Concept(value)
    }
}

impl From<ConceptSchemeNode> for IndexedNode {
    fn from(value: ConceptSchemeNode) -> Self {
        Self::Scheme(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_type_label() {
        assert_eq!(
            NodeKind::classify(None, &[TypeRef::new("x:c", "Concept")]),
            NodeKind::Concept
        );
        assert_eq!(
            NodeKind::classify(None, &[TypeRef::new("x:s", "Concept Scheme")]),
            NodeKind::ConceptScheme
        );
        assert_eq!(
            NodeKind::classify(None, &[TypeRef::new("x:s", "ConceptScheme")]),
            NodeKind::ConceptScheme
        );
    }

    #[test]
    fn classify_prefers_typename() {
        let types = [TypeRef::new("x:c", "Concept")];
        assert_eq!(
            NodeKind::classify(Some("ConceptScheme"), &types),
            NodeKind::ConceptScheme
        );
    }

    #[test]
    fn classify_falls_back_to_type_uri() {
        let types = [TypeRef::new(format!("{SKOS_NS}Concept"), "Begrip")];
        assert_eq!(NodeKind::classify(None, &types), NodeKind::Concept);
    }

    #[test]
    fn classify_unknown_is_other() {
        assert_eq!(NodeKind::classify(None, &[]), NodeKind::Other);
        assert_eq!(
            NodeKind::classify(Some("Collection"), &[TypeRef::new("x:k", "Collection")]),
            NodeKind::Other
        );
    }

    #[test]
    fn only_first_type_is_consulted() {
        let types = [TypeRef::new("x:k", "Collection"), TypeRef::concept()];
        assert_eq!(NodeKind::classify(None, &types), NodeKind::Other);
    }

    #[test]
    fn constructors_set_kind() {
        assert!(ConceptNode::new("c", "C").kind().is_concept());
        assert!(ConceptSchemeNode::new("s", "S").kind().is_scheme());
    }

    #[test]
    fn summary_drops_relations() {
        let concept = ConceptNode::new("c", "C")
            .with_narrower(vec![ConceptNode::new("c1", "C1")])
            .with_definition(vec![Literal::new("a thing", Some("en"))]);

        let summary = concept.summary();
        assert!(summary.narrower.is_empty());
        assert!(summary.definition.is_empty());
        assert_eq!(summary.node, concept.node);
    }

    #[test]
    fn indexed_node_accessors() {
        let node = IndexedNode::from(ConceptSchemeNode::new("s", "Scheme"));
        assert_eq!(node.uri().as_str(), "s");
        assert_eq!(node.label(), "Scheme");
        assert!(node.as_scheme().is_some());
        assert!(node.as_concept().is_none());
    }
}

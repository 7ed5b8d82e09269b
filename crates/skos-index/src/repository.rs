//! Concept repository boundary
//!
//! [`ConceptRepository`] is the only way the index reaches the outside world.
//! [`InMemoryRepository`] answers from a taxonomy document held in memory.

use async_trait::async_trait;
use skos_model::wire::QueryData;
use skos_model::{ConceptNode, ConceptSchemeNode, Uri};

use crate::error::RepositoryError;

/// Source of taxonomy records
///
/// Implementations are stateless with respect to the index and perform no
/// caching or retries of their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConceptRepository: Send + Sync {
    /// All concept schemes, each with its top concepts and one level of
    /// their narrower concepts
    async fn fetch_roots(&self) -> Result<Vec<ConceptSchemeNode>, RepositoryError>;

    /// Concepts whose `broader` relation includes `parent`
    async fn fetch_children(&self, parent: &Uri) -> Result<Vec<ConceptNode>, RepositoryError>;

    /// Full concept record, `None` if the backend does not know `uri`
    async fn fetch_detail(&self, uri: &Uri) -> Result<Option<ConceptNode>, RepositoryError>;
}

/// Repository answering from memory
///
/// Children of `P` are the concepts whose `broader` list contains `P`. Each
/// returned concept carries its own narrower summaries, the same one-level
/// lookahead a GraphQL backend provides.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    schemes: Vec<ConceptSchemeNode>,
    concepts: Vec<ConceptNode>,
}

impl InMemoryRepository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a `{ "conceptSchemes": [...], "concepts": [...] }` document
    ///
    /// # Errors
    /// Returns [`RepositoryError::Decode`] if the JSON does not match.
    pub fn from_json(json: &str) -> Result<Self, RepositoryError> {
        let data: QueryData =
            serde_json::from_str(json).map_err(|e| RepositoryError::Decode(e.to_string()))?;

        Ok(Self {
            schemes: data
                .concept_schemes
                .unwrap_or_default()
                .into_iter()
                .map(ConceptSchemeNode::from)
                .collect(),
            concepts: data
                .concepts
                .unwrap_or_default()
                .into_iter()
                .map(ConceptNode::from)
                .collect(),
        })
    }

    /// With concept scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: ConceptSchemeNode) -> Self {
        self.schemes.push(scheme);
        self
    }

    /// With concept
    #[must_use]
    pub fn with_concept(mut self, concept: ConceptNode) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Number of concepts held
    #[inline]
    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    fn children_of(&self, parent: &Uri) -> impl Iterator<Item = &ConceptNode> + '_ {
        let parent = parent.clone();
        self.concepts
            .iter()
            .filter(move |c| c.broader.iter().any(|b| b.uri() == &parent))
    }

    fn narrower_summaries(&self, uri: &Uri) -> Vec<ConceptNode> {
        self.children_of(uri).map(ConceptNode::summary).collect()
    }

    fn with_lookahead(&self, concept: &ConceptNode) -> ConceptNode {
        let mut out = concept.summary();
        out.broader = concept.broader.iter().map(ConceptNode::summary).collect();
        out.narrower = if concept.narrower.is_empty() {
            self.narrower_summaries(concept.uri())
        } else {
            concept.narrower.iter().map(ConceptNode::summary).collect()
        };
        out
    }
}

#[async_trait]
impl ConceptRepository for InMemoryRepository {
    async fn fetch_roots(&self) -> Result<Vec<ConceptSchemeNode>, RepositoryError> {
        Ok(self
            .schemes
            .iter()
            .map(|scheme| {
                let mut scheme = scheme.clone();
                scheme.has_top_concept = scheme
                    .has_top_concept
                    .iter()
                    .map(|top| self.with_lookahead(top))
                    .collect();
                scheme
            })
            .collect())
    }

    async fn fetch_children(&self, parent: &Uri) -> Result<Vec<ConceptNode>, RepositoryError> {
        Ok(self
            .children_of(parent)
            .map(|child| self.with_lookahead(child))
            .collect())
    }

    async fn fetch_detail(&self, uri: &Uri) -> Result<Option<ConceptNode>, RepositoryError> {
        Ok(self.concepts.iter().find(|c| c.uri() == uri).map(|concept| {
            let mut detail = concept.clone();
            if detail.narrower.is_empty() {
                detail.narrower = self.narrower_summaries(uri);
            }
            detail
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "conceptSchemes": [
            {"uri": "s", "label": "Scheme", "__typename": "ConceptScheme",
             "hasTopConcept": [{"uri": "c1", "label": "One", "__typename": "Concept"}]}
        ],
        "concepts": [
            {"uri": "c1", "label": "One", "__typename": "Concept"},
            {"uri": "c2", "label": "Two", "__typename": "Concept", "broader": [{"uri": "c1"}],
             "definition": [{"string": "second", "lang": "en"}]},
            {"uri": "c3", "label": "Three", "__typename": "Concept", "broader": [{"uri": "c2"}]}
        ]
    }"#;

    #[tokio::test]
    async fn roots_carry_lookahead() {
        let repo = InMemoryRepository::from_json(DOC).unwrap();
        let roots = repo.fetch_roots().await.unwrap();

        assert_eq!(roots.len(), 1);
        let top = &roots[0].has_top_concept[0];
        assert_eq!(top.uri().as_str(), "c1");
        assert_eq!(top.narrower.len(), 1);
        assert_eq!(top.narrower[0].uri().as_str(), "c2");
    }

    #[tokio::test]
    async fn children_by_broader() {
        let repo = InMemoryRepository::from_json(DOC).unwrap();

        let children = repo.fetch_children(&Uri::new("c1")).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].uri().as_str(), "c2");
        assert_eq!(children[0].narrower[0].uri().as_str(), "c3");
        assert!(children[0].definition.is_empty());

        let none = repo.fetch_children(&Uri::new("c3")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn detail_is_full_record() {
        let repo = InMemoryRepository::from_json(DOC).unwrap();

        let detail = repo.fetch_detail(&Uri::new("c2")).await.unwrap().unwrap();
        assert_eq!(detail.definition[0].text, "second");
        assert_eq!(detail.narrower[0].uri().as_str(), "c3");

        assert!(repo.fetch_detail(&Uri::new("missing")).await.unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = InMemoryRepository::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));
    }
}

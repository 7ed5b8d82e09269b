//! Node index with lazy child loading
//!
//! Provides [`NodeIndex`], the single source of truth mapping URI to node
//! data and URI to its ordered child list.

use dashmap::DashMap;
use moka::future::Cache;
use serde::Serialize;
use skos_model::{ConceptNode, IndexedNode, NodeKind, Uri};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{IndexError, IndexResult, RepositoryError};
use crate::repository::ConceptRepository;

/// Incremental URI index over a [`ConceptRepository`]
///
/// Both maps are append/overwrite only and are never evicted during a
/// session. A missing child-list entry means "not loaded yet", which is
/// distinct from a loaded, empty entry.
///
/// Children fetches for concepts go through a request-coalescing map keyed
/// by URI: concurrent callers share one in-flight fetch, and a completed
/// fetch is never repeated. Failed fetches are not remembered.
pub struct NodeIndex {
    repository: Arc<dyn ConceptRepository>,

    /// URI -> node record
    nodes: DashMap<Uri, IndexedNode>,

    /// URI -> ordered child URIs
    children: DashMap<Uri, Vec<Uri>>,

    /// Completed (and in-flight) children fetches, unbounded
    fetched: Cache<Uri, Arc<Vec<Uri>>>,

    /// Successful repository round trips for children
    fetches_completed: AtomicU64,
}

/// Index size counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Node records held
    pub nodes: usize,
    /// Child-list entries held (loaded or loaded-empty)
    pub child_lists: usize,
    /// Children fetches that reached the repository and succeeded
    pub fetches_completed: u64,
}

impl std::fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIndex")
            .field("nodes", &self.nodes.len())
            .field("child_lists", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl NodeIndex {
    /// Create empty index over a repository
    #[must_use]
    pub fn new(repository: Arc<dyn ConceptRepository>) -> Self {
        Self {
            repository,
            nodes: DashMap::new(),
            children: DashMap::new(),
            fetched: Cache::builder().build(),
            fetches_completed: AtomicU64::new(0),
        }
    }

    /// Underlying repository
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn ConceptRepository> {
        &self.repository
    }

    /// Lookup node record
    #[must_use]
    pub fn get_node(&self, uri: &str) -> Option<IndexedNode> {
        self.nodes.get(uri).map(|entry| entry.value().clone())
    }

    /// Lookup node kind without cloning the record
    #[must_use]
    pub fn kind_of(&self, uri: &str) -> Option<NodeKind> {
        self.nodes.get(uri).map(|entry| entry.kind())
    }

    /// Display label of a known node
    #[must_use]
    pub fn label_of(&self, uri: &str) -> Option<String> {
        self.nodes.get(uri).map(|entry| entry.label().to_string())
    }

    /// Check if a non-empty child list is known for `uri`
    ///
    /// Never triggers loading.
    #[must_use]
    pub fn has_children(&self, uri: &str) -> bool {
        self.children.get(uri).is_some_and(|list| !list.is_empty())
    }

    /// Check if any child list, possibly empty, is known for `uri`
    #[must_use]
    pub fn is_loaded(&self, uri: &str) -> bool {
        self.children.contains_key(uri)
    }

    /// Known child list, without loading
    #[must_use]
    pub fn child_list(&self, uri: &str) -> Option<Vec<Uri>> {
        self.children.get(uri).map(|list| list.value().clone())
    }

    /// Resolve the children of `uri`
    ///
    /// - Concepts load their children from the repository once.
    /// - Concept schemes answer from the top concepts seeded by
    ///   [`load_roots`](Self::load_roots).
    /// - Other kinds and unknown URIs resolve to `None`.
    ///
    /// # Errors
    /// Returns [`IndexError::Children`] when the repository call fails.
    pub async fn get_children(&self, uri: &Uri) -> IndexResult<Option<Vec<Uri>>> {
        let Some(kind) = self.kind_of(uri) else {
            tracing::debug!(uri = %uri, "children requested for unknown node");
            return Ok(None);
        };

        match kind {
            NodeKind::Concept => {
                let children = self
                    .fetched
                    .try_get_with(uri.clone(), self.fetch_children(uri))
                    .await
                    .map_err(|source| IndexError::Children {
                        uri: uri.clone(),
                        source,
                    })?;
                Ok(Some(children.as_ref().clone()))
            }
            NodeKind::ConceptScheme => Ok(self.child_list(uri)),
            NodeKind::Other => {
                tracing::debug!(uri = %uri, "node kind has no children path");
                Ok(None)
            }
        }
    }

    async fn fetch_children(&self, uri: &Uri) -> Result<Arc<Vec<Uri>>, RepositoryError> {
        tracing::debug!(uri = %uri, "fetching children");
        let concepts = self.repository.fetch_children(uri).await?;

        let child_uris: Vec<Uri> = concepts.iter().map(|c| c.uri().clone()).collect();
        for concept in concepts {
            self.seed_concept(concept);
        }
        self.children.insert(uri.clone(), child_uris.clone());
        self.fetches_completed.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(uri = %uri, count = child_uris.len(), "children loaded");
        Ok(Arc::new(child_uris))
    }

    /// Record a concept and pre-seed its children from the narrower list
    /// the response carried. Lookahead never replaces existing entries.
    fn seed_concept(&self, concept: ConceptNode) {
        let uri = concept.uri().clone();

        if !concept.narrower.is_empty() {
            let grandchildren: Vec<Uri> = concept.narrower.iter().map(|n| n.uri().clone()).collect();
            for narrower in &concept.narrower {
                self.nodes
                    .entry(narrower.uri().clone())
                    .or_insert_with(|| IndexedNode::Concept(narrower.summary()));
            }
            self.children.entry(uri.clone()).or_insert(grandchildren);
        }

        self.nodes.insert(uri, IndexedNode::Concept(concept.summary()));
    }

    /// Load all concept schemes
    ///
    /// Seeds each scheme, its top concepts and one level of their narrower
    /// concepts. A scheme without top concepts is recorded as loaded-empty.
    ///
    /// # Returns
    /// Root URIs in repository order
    ///
    /// # Errors
    /// Returns [`IndexError::Roots`] when the repository call fails.
    pub async fn load_roots(&self) -> IndexResult<Vec<Uri>> {
        let schemes = self
            .repository
            .fetch_roots()
            .await
            .map_err(|e| IndexError::Roots {
                source: Arc::new(e),
            })?;

        let mut roots = Vec::with_capacity(schemes.len());
        for scheme in schemes {
            let uri = scheme.uri().clone();
            let top: Vec<Uri> = scheme.has_top_concept.iter().map(|c| c.uri().clone()).collect();

            for concept in &scheme.has_top_concept {
                self.seed_concept(concept.clone());
            }
            self.children.insert(uri.clone(), top);
            self.nodes.insert(uri.clone(), IndexedNode::Scheme(scheme));
            roots.push(uri);
        }

        tracing::info!(count = roots.len(), "loaded concept scheme roots");
        Ok(roots)
    }

    /// Fetch the full record of a concept
    ///
    /// Always asks the repository and replaces the stored record wholesale.
    /// The narrower relation seeds the child list only when none is known.
    ///
    /// # Errors
    /// Returns [`IndexError::Detail`] when the repository call fails.
    pub async fn load_concept(&self, uri: &Uri) -> IndexResult<Option<ConceptNode>> {
        let detail = self
            .repository
            .fetch_detail(uri)
            .await
            .map_err(|e| IndexError::Detail {
                uri: uri.clone(),
                source: Arc::new(e),
            })?;

        let Some(concept) = detail else {
            tracing::debug!(uri = %uri, "no detail record");
            return Ok(None);
        };

        if !concept.narrower.is_empty() {
            for narrower in &concept.narrower {
                self.nodes
                    .entry(narrower.uri().clone())
                    .or_insert_with(|| IndexedNode::Concept(narrower.summary()));
            }
            self.children
                .entry(uri.clone())
                .or_insert_with(|| concept.narrower.iter().map(|n| n.uri().clone()).collect());
        }

        self.nodes
            .insert(uri.clone(), IndexedNode::Concept(concept.clone()));
        Ok(Some(concept))
    }

    /// All known URIs, sorted
    #[must_use]
    pub fn uris(&self) -> Vec<Uri> {
        let mut uris: Vec<Uri> = self.nodes.iter().map(|entry| entry.key().clone()).collect();
        uris.sort();
        uris
    }

    /// Size counters
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            nodes: self.nodes.len(),
            child_lists: self.children.len(),
            fetches_completed: self.fetches_completed.load(Ordering::Relaxed),
        }
    }
}

//! Testing utilities for the SKOS explorer workspace
//!
//! Repository wrappers that count, gate or fail calls, plus taxonomy fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use skos_index::{ConceptRepository, InMemoryRepository, RepositoryError};
use skos_model::{ConceptNode, ConceptSchemeNode, Literal, Uri};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Scheme `A` with top concepts `A1`, `A2` (no narrower), scheme `B` with none
pub fn two_scheme_repository() -> InMemoryRepository {
    InMemoryRepository::new()
        .with_scheme(
            ConceptSchemeNode::new("A", "Scheme A").with_top_concepts(vec![
                ConceptNode::new("A1", "A one"),
                ConceptNode::new("A2", "A two"),
            ]),
        )
        .with_scheme(ConceptSchemeNode::new("B", "Scheme B"))
        .with_concept(ConceptNode::new("A1", "A one"))
        .with_concept(ConceptNode::new("A2", "A two"))
}

/// Scheme `S` with `breadth` top concepts, each subtree `depth` levels deep
///
/// Concept URIs are paths such as `S/0/2/1`, labels are `node 0.2.1`.
pub fn deep_repository(breadth: usize, depth: usize) -> InMemoryRepository {
    let mut repo = InMemoryRepository::new();
    let mut top = Vec::new();
    let mut frontier: Vec<(String, usize)> = Vec::new();

    for i in 0..breadth {
        let uri = format!("S/{i}");
        top.push(ConceptNode::new(uri.as_str(), label_for(&uri)));
        repo = repo.with_concept(ConceptNode::new(uri.as_str(), label_for(&uri)));
        frontier.push((uri, 1));
    }

    while let Some((parent, level)) = frontier.pop() {
        if level >= depth {
            continue;
        }
        for i in 0..breadth {
            let uri = format!("{parent}/{i}");
            repo = repo.with_concept(
                ConceptNode::new(uri.as_str(), label_for(&uri))
                    .with_broader(vec![ConceptNode::new(parent.as_str(), "")]),
            );
            frontier.push((uri, level + 1));
        }
    }

    repo.with_scheme(ConceptSchemeNode::new("S", "Scheme S").with_top_concepts(top))
}

fn label_for(uri: &str) -> String {
    format!("node {}", uri.trim_start_matches("S/").replace('/', "."))
}

/// Small water-management taxonomy in GraphQL response shape
pub const WATER_TAXONOMY_JSON: &str = r#"{
    "conceptSchemes": [
        {
            "uri": "http://example.org/scheme/water",
            "label": "Water",
            "__typename": "ConceptScheme",
            "aantalBegrippen": 4,
            "hasTopConcept": [
                {"uri": "http://example.org/begrip/waterbody", "label": "Water body", "__typename": "Concept"},
                {"uri": "http://example.org/begrip/structure", "label": "Hydraulic structure", "__typename": "Concept"}
            ]
        },
        {
            "uri": "http://example.org/scheme/empty",
            "label": "Empty scheme",
            "__typename": "ConceptScheme"
        }
    ],
    "concepts": [
        {"uri": "http://example.org/begrip/waterbody", "label": "Water body", "__typename": "Concept",
         "definition": [{"string": "Any accumulation of water", "lang": "en"}]},
        {"uri": "http://example.org/begrip/structure", "label": "Hydraulic structure", "__typename": "Concept"},
        {"uri": "http://example.org/begrip/canal", "label": "Canal", "__typename": "Concept",
         "broader": [{"uri": "http://example.org/begrip/waterbody"}],
         "altLabel": [{"string": "Channel", "lang": "en"}]},
        {"uri": "http://example.org/begrip/lock", "label": "Lock", "__typename": "Concept",
         "broader": [{"uri": "http://example.org/begrip/structure"}],
         "scopeNote": [{"string": "Navigation locks only", "lang": "en"}]}
    ]
}"#;

/// Repository decoded from [`WATER_TAXONOMY_JSON`]
pub fn water_repository() -> InMemoryRepository {
    InMemoryRepository::from_json(WATER_TAXONOMY_JSON).expect("fixture decodes")
}

/// Concept with a definition in one language
pub fn defined_concept(uri: &str, label: &str, definition: &str) -> ConceptNode {
    ConceptNode::new(uri, label).with_definition(vec![Literal::new(definition, Some("en"))])
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Repository wrapper that counts every call
#[derive(Debug)]
pub struct CountingRepository<R> {
    inner: R,
    roots: AtomicUsize,
    details: AtomicUsize,
    children: Mutex<HashMap<Uri, usize>>,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            roots: AtomicUsize::new(0),
            details: AtomicUsize::new(0),
            children: Mutex::new(HashMap::new()),
        }
    }

    pub fn roots_calls(&self) -> usize {
        self.roots.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.details.load(Ordering::SeqCst)
    }

    /// Total children calls across all parents
    pub fn children_calls(&self) -> usize {
        self.children.lock().values().sum()
    }

    pub fn children_calls_for(&self, parent: &str) -> usize {
        self.children.lock().get(parent).copied().unwrap_or(0)
    }
}

#[async_trait]
impl<R: ConceptRepository> ConceptRepository for CountingRepository<R> {
    async fn fetch_roots(&self) -> Result<Vec<ConceptSchemeNode>, RepositoryError> {
        self.roots.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_roots().await
    }

    async fn fetch_children(&self, parent: &Uri) -> Result<Vec<ConceptNode>, RepositoryError> {
        *self.children.lock().entry(parent.clone()).or_insert(0) += 1;
        self.inner.fetch_children(parent).await
    }

    async fn fetch_detail(&self, uri: &Uri) -> Result<Option<ConceptNode>, RepositoryError> {
        self.details.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_detail(uri).await
    }
}

// ---------------------------------------------------------------------------
// Gating
// ---------------------------------------------------------------------------

/// Handle controlling one gated URI
#[derive(Debug, Clone)]
pub struct Gate {
    started: Arc<Notify>,
    open: Arc<watch::Sender<bool>>,
}

impl Gate {
    fn new() -> Self {
        let (open, _) = watch::channel(false);
        Self {
            started: Arc::new(Notify::new()),
            open: Arc::new(open),
        }
    }

    /// Wait until a gated call for this URI has reached the repository
    pub async fn started(&self) {
        self.started.notified().await;
    }

    /// Let held and future calls through
    pub fn release(&self) {
        self.open.send_replace(true);
    }

    async fn pass(&self) {
        self.started.notify_one();
        let mut rx = self.open.subscribe();
        // Sender lives in self, so the channel cannot close while waiting
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// Repository wrapper holding children and detail calls for chosen URIs
/// until their gate is released
#[derive(Debug)]
pub struct GatedRepository<R> {
    inner: R,
    gates: Mutex<HashMap<Uri, Gate>>,
}

impl<R> GatedRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Gate calls for `uri`; returns the controlling handle
    pub fn gate(&self, uri: &str) -> Gate {
        self.gates
            .lock()
            .entry(Uri::new(uri))
            .or_insert_with(Gate::new)
            .clone()
    }

    fn gate_for(&self, uri: &Uri) -> Option<Gate> {
        self.gates.lock().get(uri).cloned()
    }
}

#[async_trait]
impl<R: ConceptRepository> ConceptRepository for GatedRepository<R> {
    async fn fetch_roots(&self) -> Result<Vec<ConceptSchemeNode>, RepositoryError> {
        self.inner.fetch_roots().await
    }

    async fn fetch_children(&self, parent: &Uri) -> Result<Vec<ConceptNode>, RepositoryError> {
        if let Some(gate) = self.gate_for(parent) {
            gate.pass().await;
        }
        self.inner.fetch_children(parent).await
    }

    async fn fetch_detail(&self, uri: &Uri) -> Result<Option<ConceptNode>, RepositoryError> {
        if let Some(gate) = self.gate_for(uri) {
            gate.pass().await;
        }
        self.inner.fetch_detail(uri).await
    }
}

// ---------------------------------------------------------------------------
// Failing
// ---------------------------------------------------------------------------

/// Repository wrapper failing a fixed number of calls per URI
#[derive(Debug)]
pub struct FailingRepository<R> {
    inner: R,
    fail_roots: AtomicUsize,
    fail_children: Mutex<HashMap<Uri, usize>>,
    fail_detail: Mutex<HashMap<Uri, usize>>,
}

impl<R> FailingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            fail_roots: AtomicUsize::new(0),
            fail_children: Mutex::new(HashMap::new()),
            fail_detail: Mutex::new(HashMap::new()),
        }
    }

    /// Fail the next `times` root listings
    #[must_use]
    pub fn failing_roots(self, times: usize) -> Self {
        self.fail_roots.store(times, Ordering::SeqCst);
        self
    }

    /// Fail the next `times` children calls for `uri`
    #[must_use]
    pub fn failing_children(self, uri: &str, times: usize) -> Self {
        self.fail_children.lock().insert(Uri::new(uri), times);
        self
    }

    /// Fail the next `times` detail calls for `uri`
    #[must_use]
    pub fn failing_detail(self, uri: &str, times: usize) -> Self {
        self.fail_detail.lock().insert(Uri::new(uri), times);
        self
    }

    fn take(counter: &Mutex<HashMap<Uri, usize>>, uri: &Uri) -> bool {
        let mut counter = counter.lock();
        match counter.get_mut(uri) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }
}

fn injected(what: &str) -> RepositoryError {
    RepositoryError::Transport(format!("injected failure: {what}"))
}

#[async_trait]
impl<R: ConceptRepository> ConceptRepository for FailingRepository<R> {
    async fn fetch_roots(&self) -> Result<Vec<ConceptSchemeNode>, RepositoryError> {
        let failed = self
            .fail_roots
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(injected("roots"));
        }
        self.inner.fetch_roots().await
    }

    async fn fetch_children(&self, parent: &Uri) -> Result<Vec<ConceptNode>, RepositoryError> {
        if Self::take(&self.fail_children, parent) {
            return Err(injected(parent));
        }
        self.inner.fetch_children(parent).await
    }

    async fn fetch_detail(&self, uri: &Uri) -> Result<Option<ConceptNode>, RepositoryError> {
        if Self::take(&self.fail_detail, uri) {
            return Err(injected(uri));
        }
        self.inner.fetch_detail(uri).await
    }
}

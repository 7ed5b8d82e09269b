//! Concept detail panel
//!
//! Follows the selection channel. Concepts are loaded in full from the
//! repository; schemes are shown from the index directly.

use parking_lot::Mutex;
use serde::Serialize;
use skos_events::{SelectionChannel, Subject, Subscription};
use skos_index::NodeIndex;
use skos_model::{ConceptNode, ConceptSchemeNode, IndexedNode, NodeKind, Uri};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// What the panel shows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    /// Nothing selected
    #[default]
    Empty,
    /// Detail request in flight
    Loading {
        /// Concept being loaded
        uri: Uri,
    },
    /// Full concept record
    Concept {
        /// Loaded record
        detail: ConceptNode,
    },
    /// Concept scheme summary
    Scheme {
        /// Scheme record
        scheme: ConceptSchemeNode,
    },
    /// Detail request failed
    Failed {
        /// Concept that failed to load
        uri: Uri,
        /// Error description
        message: String,
    },
}

/// Detail view attached to a [`SelectionChannel`]
pub struct ContentPanel {
    index: Arc<NodeIndex>,
    runtime: Handle,
    state: Mutex<PanelState>,
    changes: Subject<PanelState>,

    /// Bumped on every selection; a detail load applies only if unchanged
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    subscription: Mutex<Option<Subscription>>,
}

impl std::fmt::Debug for ContentPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPanel")
            .field("state", &*self.state.lock())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ContentPanel {
    /// Create panel and subscribe it to `selection`
    ///
    /// Detail loads are spawned on `runtime`. A current selection is shown
    /// immediately.
    #[must_use]
    pub fn attach(index: Arc<NodeIndex>, selection: &SelectionChannel, runtime: Handle) -> Arc<Self> {
        let panel = Arc::new(Self {
            index,
            runtime,
            state: Mutex::new(PanelState::Empty),
            changes: Subject::new(),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            subscription: Mutex::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&panel);
        let subscription = selection.subscribe(move |uri| {
            if let Some(panel) = weak.upgrade() {
                panel.show(uri);
            }
        });
        *panel.subscription.lock() = Some(subscription);
        panel
    }

    /// Stop following the selection
    pub fn detach(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
    }

    /// Current display state
    #[must_use]
    pub fn state(&self) -> PanelState {
        self.state.lock().clone()
    }

    /// Observe display state changes
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PanelState) + Send + Sync + 'static,
    {
        self.changes.subscribe(handler)
    }

    /// Wait for the most recent detail load to finish
    pub async fn settle(&self) {
        let pending = self.in_flight.lock().take();
        if let Some(handle) = pending {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "detail task did not complete");
            }
        }
    }

    /// Replace the state if no newer selection arrived since `generation`
    ///
    /// Compared under the state lock; [`Self::begin`] bumps under the same lock.
    fn set_if_current(&self, generation: u64, state: PanelState) -> bool {
        {
            let mut current = self.state.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = state.clone();
        }
        self.changes.emit(state);
        true
    }

    fn begin(&self) -> (u64, bool) {
        let state = self.state.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, matches!(*state, PanelState::Loading { .. }))
    }

    fn show(self: &Arc<Self>, uri: Option<&Uri>) {
        let (generation, was_loading) = self.begin();

        let Some(uri) = uri else {
            self.set_if_current(generation, PanelState::Empty);
            return;
        };

        match self.index.get_node(uri) {
            Some(IndexedNode::Scheme(scheme)) => {
                self.set_if_current(generation, PanelState::Scheme { scheme });
            }
            Some(node) if node.kind() == NodeKind::Concept => {
                if self.set_if_current(generation, PanelState::Loading { uri: uri.clone() }) {
                    self.spawn_load(uri.clone(), generation);
                }
            }
            _ => {
                tracing::debug!(uri = %uri, "selection has no detail view");
                if was_loading {
                    self.set_if_current(generation, PanelState::Empty);
                }
            }
        }
    }

    fn spawn_load(self: &Arc<Self>, uri: Uri, generation: u64) {
        let panel = Arc::downgrade(self);
        let index = Arc::clone(&self.index);

        let handle = self.runtime.spawn(async move {
            let result = index.load_concept(&uri).await;
            let Some(panel) = panel.upgrade() else {
                return;
            };

            let next = match result {
                Ok(Some(detail)) => PanelState::Concept { detail },
                Ok(None) => PanelState::Failed {
                    uri,
                    message: "concept not found".to_string(),
                },
                Err(e) => {
                    tracing::warn!(uri = %uri, error = %e, "failed to load concept detail");
                    PanelState::Failed {
                        uri,
                        message: e.to_string(),
                    }
                }
            };
            if !panel.set_if_current(generation, next) {
                tracing::debug!("discarding detail for previous selection");
            }
        });

        // a replaced handle keeps running detached; its result is discarded
        *self.in_flight.lock() = Some(handle);
    }
}

impl Drop for ContentPanel {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skos_index::InMemoryRepository;
    use skos_test_utils::{defined_concept, GatedRepository};

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_scheme(
                ConceptSchemeNode::new("S", "Scheme")
                    .with_top_concepts(vec![ConceptNode::new("a", "A"), ConceptNode::new("b", "B")]),
            )
            .with_concept(defined_concept("a", "A", "first"))
            .with_concept(defined_concept("b", "B", "second"))
    }

    async fn panel_over(
        repo: Arc<dyn skos_index::ConceptRepository>,
    ) -> (Arc<ContentPanel>, SelectionChannel) {
        let index = Arc::new(NodeIndex::new(repo));
        index.load_roots().await.unwrap();
        let selection = SelectionChannel::new();
        let panel = ContentPanel::attach(index, &selection, Handle::current());
        (panel, selection)
    }

    #[tokio::test]
    async fn concept_selection_loads_detail() {
        let (panel, selection) = panel_over(Arc::new(repo())).await;

        selection.select("a");
        assert_eq!(panel.state(), PanelState::Loading { uri: Uri::new("a") });

        panel.settle().await;
        match panel.state() {
            PanelState::Concept { detail } => assert_eq!(detail.definition[0].text, "first"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn scheme_selection_is_immediate() {
        let (panel, selection) = panel_over(Arc::new(repo())).await;
        selection.select("S");
        assert!(matches!(panel.state(), PanelState::Scheme { .. }));
    }

    #[tokio::test]
    async fn unknown_selection_keeps_state() {
        let (panel, selection) = panel_over(Arc::new(repo())).await;
        selection.select("S");
        selection.select("nowhere");
        assert!(matches!(panel.state(), PanelState::Scheme { .. }));

        selection.clear();
        assert_eq!(panel.state(), PanelState::Empty);
    }

    #[tokio::test]
    async fn stale_detail_is_discarded() {
        let gated = Arc::new(GatedRepository::new(repo()));
        let gate = gated.gate("a");
        let (panel, selection) = panel_over(gated.clone()).await;

        selection.select("a");
        let first = panel.in_flight.lock().take().unwrap();
        gate.started().await;

        selection.select("b");
        panel.settle().await;
        gate.release();
        first.await.unwrap();

        match panel.state() {
            PanelState::Concept { detail } => assert_eq!(detail.uri().as_str(), "b"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn superseded_write_never_overwrites_newer_state() {
        let (panel, selection) = panel_over(Arc::new(repo())).await;

        selection.select("a");
        let loading = panel.generation.load(Ordering::SeqCst);
        selection.select("S");
        assert!(matches!(panel.state(), PanelState::Scheme { .. }));

        let late = PanelState::Concept {
            detail: defined_concept("a", "A", "first"),
        };
        assert!(!panel.set_if_current(loading, late));
        assert!(matches!(panel.state(), PanelState::Scheme { .. }));

        panel.settle().await;
        assert!(matches!(panel.state(), PanelState::Scheme { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn scheme_selection_wins_over_detail_on_worker_threads() {
        let (panel, selection) = panel_over(Arc::new(repo())).await;

        for _ in 0..200 {
            selection.select("a");
            selection.select("S");
            panel.settle().await;
            assert!(matches!(panel.state(), PanelState::Scheme { .. }));
        }
    }

    #[tokio::test]
    async fn missing_detail_is_failure() {
        let repo = InMemoryRepository::new().with_scheme(
            ConceptSchemeNode::new("S", "S").with_top_concepts(vec![ConceptNode::new("ghost", "G")]),
        );
        let (panel, selection) = panel_over(Arc::new(repo)).await;

        selection.select("ghost");
        panel.settle().await;
        assert!(matches!(panel.state(), PanelState::Failed { .. }));
    }
}

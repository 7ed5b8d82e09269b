//! Spatial explorer scene
//!
//! Scene state behind the 3D view: the scheme at its centre, the member
//! nodes around it, what is hovered and focused, and which layout is
//! active. Rendering is out of scope; the scene reacts to bus events and
//! emits its own picks.

use parking_lot::Mutex;
use serde::Serialize;
use skos_events::{EventSource, InteractionBus, InteractionEvent, InteractionKind, Subscription};
use skos_index::NodeIndex;
use skos_model::{ConceptNode, IndexedNode, NodeKind, Uri};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;

/// Layout of the member nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Members on a sphere around the root
    #[default]
    Sphere,
    /// Members on a flat grid
    Grid,
    /// Members along a helix
    Helix,
}

/// Serializable scene state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SceneSnapshot {
    /// Scheme at the centre
    pub root: Option<Uri>,
    /// Nodes placed around the root
    pub members: Vec<Uri>,
    /// Focused concept
    pub focused: Option<Uri>,
    /// Full record of the focused concept, once loaded
    pub focused_detail: Option<ConceptNode>,
    /// Hovered node
    pub hovered: Option<Uri>,
    /// Active layout
    pub arrangement: Arrangement,
}

/// Scene driven by the [`InteractionBus`]
pub struct ExplorerScene {
    index: Arc<NodeIndex>,
    bus: InteractionBus,
    runtime: Handle,
    state: Mutex<SceneSnapshot>,
    subscription: Mutex<Option<Subscription>>,
}

impl std::fmt::Debug for ExplorerScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerScene")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ExplorerScene {
    /// Create scene and subscribe it to tree selections and hovers
    ///
    /// Its own [`InteractionKind::ExplorerSelect`] events are never handled.
    #[must_use]
    pub fn attach(index: Arc<NodeIndex>, bus: InteractionBus, runtime: Handle) -> Arc<Self> {
        let scene = Arc::new(Self {
            index,
            bus: bus.clone(),
            runtime,
            state: Mutex::new(SceneSnapshot::default()),
            subscription: Mutex::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&scene);
        let subscription = bus.subscribe_kinds(
            &[
                InteractionKind::TreeSelect,
                InteractionKind::HoverEnter,
                InteractionKind::HoverExit,
            ],
            move |event| {
                if let Some(scene) = weak.upgrade() {
                    scene.handle(event);
                }
            },
        );
        *scene.subscription.lock() = Some(subscription);
        scene
    }

    /// Stop reacting to bus events
    pub fn detach(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        self.state.lock().clone()
    }

    /// Switch layout
    pub fn arrange(&self, arrangement: Arrangement) {
        self.state.lock().arrangement = arrangement;
    }

    /// User picked a node in the scene
    pub fn pick(&self, uri: impl Into<Uri>) {
        self.bus.emit(InteractionEvent::new(
            InteractionKind::ExplorerSelect,
            EventSource::Explorer,
            uri,
        ));
    }

    fn handle(self: &Arc<Self>, event: &InteractionEvent) {
        match event.kind {
            InteractionKind::TreeSelect => self.select(&event.uri),
            InteractionKind::HoverEnter => {
                self.state.lock().hovered = Some(event.uri.clone());
            }
            InteractionKind::HoverExit => {
                let mut state = self.state.lock();
                if state.hovered.as_ref() == Some(&event.uri) {
                    state.hovered = None;
                }
            }
            InteractionKind::ExplorerSelect => {}
        }
    }

    fn select(self: &Arc<Self>, uri: &Uri) {
        match self.index.get_node(uri) {
            Some(IndexedNode::Scheme(scheme)) => {
                let mut state = self.state.lock();
                let hovered = state.hovered.take();
                *state = SceneSnapshot {
                    root: Some(scheme.uri().clone()),
                    members: scheme
                        .has_top_concept
                        .iter()
                        .map(|c| c.uri().clone())
                        .collect(),
                    hovered,
                    ..SceneSnapshot::default()
                };
                tracing::debug!(root = %uri, members = state.members.len(), "scene rebuilt");
            }
            Some(node) if node.kind() == NodeKind::Concept => {
                {
                    let mut state = self.state.lock();
                    state.focused = Some(uri.clone());
                    state.focused_detail = None;
                }
                self.spawn_focus(uri.clone());
            }
            _ => tracing::debug!(uri = %uri, "scene ignores selection"),
        }
    }

    fn spawn_focus(self: &Arc<Self>, uri: Uri) {
        let scene = Arc::downgrade(self);
        let index = Arc::clone(&self.index);

        self.runtime.spawn(async move {
            match index.load_concept(&uri).await {
                Ok(Some(detail)) => {
                    let Some(scene) = scene.upgrade() else {
                        return;
                    };
                    let mut state = scene.state.lock();
                    if state.focused.as_ref() == Some(&uri) {
                        state.focused_detail = Some(detail);
                    }
                }
                Ok(None) => tracing::debug!(uri = %uri, "focused concept has no detail"),
                Err(e) => tracing::warn!(uri = %uri, error = %e, "failed to load focused concept"),
            }
        });
    }
}

impl Drop for ExplorerScene {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skos_index::InMemoryRepository;
    use skos_model::ConceptSchemeNode;

    async fn scene() -> (Arc<ExplorerScene>, InteractionBus) {
        let repo = InMemoryRepository::new()
            .with_scheme(
                ConceptSchemeNode::new("S", "Scheme")
                    .with_top_concepts(vec![ConceptNode::new("a", "A"), ConceptNode::new("b", "B")]),
            )
            .with_concept(ConceptNode::new("a", "A"));
        let index = Arc::new(NodeIndex::new(Arc::new(repo)));
        index.load_roots().await.unwrap();

        let bus = InteractionBus::new();
        let scene = ExplorerScene::attach(index, bus.clone(), Handle::current());
        (scene, bus)
    }

    fn event(kind: InteractionKind, source: EventSource, uri: &str) -> InteractionEvent {
        InteractionEvent::new(kind, source, uri)
    }

    #[tokio::test]
    async fn tree_scheme_selection_rebuilds_scene() {
        let (scene, bus) = scene().await;
        scene.arrange(Arrangement::Helix);

        bus.emit(event(InteractionKind::TreeSelect, EventSource::Tree, "S"));

        let snapshot = scene.snapshot();
        assert_eq!(snapshot.root, Some(Uri::new("S")));
        assert_eq!(snapshot.members, vec![Uri::new("a"), Uri::new("b")]);
        assert_eq!(snapshot.arrangement, Arrangement::Sphere);
    }

    #[tokio::test]
    async fn own_picks_are_ignored() {
        let (scene, bus) = scene().await;
        scene.pick("S");

        assert_eq!(bus.latest().map(|e| e.kind), Some(InteractionKind::ExplorerSelect));
        assert_eq!(scene.snapshot().root, None);
    }

    #[tokio::test]
    async fn hover_sets_and_clears() {
        let (scene, bus) = scene().await;
        bus.emit(event(InteractionKind::HoverEnter, EventSource::Tree, "a"));
        assert_eq!(scene.snapshot().hovered, Some(Uri::new("a")));

        bus.emit(event(InteractionKind::HoverExit, EventSource::Tree, "b"));
        assert_eq!(scene.snapshot().hovered, Some(Uri::new("a")));

        bus.emit(event(InteractionKind::HoverExit, EventSource::Tree, "a"));
        assert_eq!(scene.snapshot().hovered, None);
    }

    #[tokio::test]
    async fn concept_selection_focuses() {
        let (scene, bus) = scene().await;
        bus.emit(event(InteractionKind::TreeSelect, EventSource::Tree, "a"));
        assert_eq!(scene.snapshot().focused, Some(Uri::new("a")));

        // let the detail task run
        for _ in 0..10 {
            tokio::task::yield_now().await;
            if scene.snapshot().focused_detail.is_some() {
                break;
            }
        }
        assert!(scene.snapshot().focused_detail.is_some());
    }
}

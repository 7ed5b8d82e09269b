//! Cross-view interaction events
//!
//! Views announce hovers and selections on the [`InteractionBus`] and react
//! to each other's announcements. Every event names its source so a view
//! can ignore what it emitted itself.

use serde::{Deserialize, Serialize};
use skos_model::Uri;
use std::fmt;

use crate::subject::{Subject, Subscription};

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Pointer entered a node
    HoverEnter,
    /// Pointer left a node
    HoverExit,
    /// Node selected in the tree
    TreeSelect,
    /// Node picked in the spatial explorer
    ExplorerSelect,
}

/// Which view emitted the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Tree view
    Tree,
    /// Concept detail panel
    ContentPanel,
    /// Spatial explorer scene
    Explorer,
    /// Anything outside the views (CLI, tests)
    External,
}

/// Interaction event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Event kind
    pub kind: InteractionKind,
    /// Emitting view
    pub source: EventSource,
    /// Node involved
    pub uri: Uri,
}

impl InteractionEvent {
    /// Create event
    #[inline]
    #[must_use]
    pub fn new(kind: InteractionKind, source: EventSource, uri: impl Into<Uri>) -> Self {
        Self {
            kind,
            source,
            uri: uri.into(),
        }
    }
}

impl fmt::Display for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} from {:?} on {}", self.kind, self.source, self.uri)
    }
}

/// Shared interaction stream
///
/// Replays the latest event to late subscribers. Clones share the stream.
#[derive(Debug, Clone, Default)]
pub struct InteractionBus {
    subject: Subject<InteractionEvent>,
}

impl InteractionBus {
    /// Create empty bus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event
    pub fn emit(&self, event: InteractionEvent) {
        tracing::debug!(kind = ?event.kind, source = ?event.source, uri = %event.uri, "interaction");
        self.subject.emit(event);
    }

    /// Most recent event
    #[must_use]
    pub fn latest(&self) -> Option<InteractionEvent> {
        self.subject.latest()
    }

    /// Observe every event
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InteractionEvent) + Send + Sync + 'static,
    {
        self.subject.subscribe(handler)
    }

    /// Observe events of the given kinds only
    pub fn subscribe_kinds<F>(&self, kinds: &[InteractionKind], handler: F) -> Subscription
    where
        F: Fn(&InteractionEvent) + Send + Sync + 'static,
    {
        let kinds = kinds.to_vec();
        self.subject.subscribe(move |event| {
            if kinds.contains(&event.kind) {
                handler(event);
            }
        })
    }
}

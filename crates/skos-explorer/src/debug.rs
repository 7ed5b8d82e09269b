//! Debug introspection
//!
//! A [`DebugHandle`] is handed out explicitly by the explorer; nothing is
//! registered globally.

use serde::Serialize;
use skos_events::{InteractionBus, InteractionEvent, SelectionChannel};
use skos_index::{IndexStats, NodeIndex};
use skos_model::{IndexedNode, Uri};
use skos_tree::{FlatRow, TreeDataSource};
use std::sync::Arc;

use crate::panel::{ContentPanel, PanelState};
use crate::scene::{ExplorerScene, SceneSnapshot};

/// Point-in-time view of every component
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    /// Index counters
    pub index: IndexStats,
    /// Visible rows
    pub rows: Vec<FlatRow>,
    /// Current selection
    pub selection: Option<Uri>,
    /// Last interaction event
    pub last_event: Option<InteractionEvent>,
    /// Detail panel state
    pub panel: PanelState,
    /// Scene state
    pub scene: SceneSnapshot,
}

/// Read-only access to explorer internals
#[derive(Debug, Clone)]
pub struct DebugHandle {
    pub(crate) index: Arc<NodeIndex>,
    pub(crate) tree: Arc<TreeDataSource>,
    pub(crate) selection: SelectionChannel,
    pub(crate) bus: InteractionBus,
    pub(crate) panel: Arc<ContentPanel>,
    pub(crate) scene: Arc<ExplorerScene>,
}

impl DebugHandle {
    /// Capture all component state
    #[must_use]
    pub fn snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            index: self.index.stats(),
            rows: self.tree.rows(),
            selection: self.selection.current(),
            last_event: self.bus.latest(),
            panel: self.panel.state(),
            scene: self.scene.snapshot(),
        }
    }

    /// Snapshot as pretty JSON
    ///
    /// # Errors
    /// Returns the serializer error if a record cannot be encoded.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    /// Raw index record
    #[must_use]
    pub fn node(&self, uri: &str) -> Option<IndexedNode> {
        self.index.get_node(uri)
    }

    /// Known child list, without loading
    #[must_use]
    pub fn children(&self, uri: &str) -> Option<Vec<Uri>> {
        self.index.child_list(uri)
    }

    /// Every URI the index holds
    #[must_use]
    pub fn known_uris(&self) -> Vec<Uri> {
        self.index.uris()
    }
}

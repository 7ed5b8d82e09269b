//! Explorer wiring
//!
//! Builds the shared index and connects the tree, detail panel and scene
//! through the selection channel and interaction bus:
//!
//! - tree selection → selection channel + `TreeSelect` on the bus
//! - `ExplorerSelect` from the scene → selection channel
//! - selection channel → detail panel

use skos_events::{
    EventSource, InteractionBus, InteractionEvent, InteractionKind, SelectionChannel, Subscription,
};
use skos_index::{ConceptRepository, IndexError, InMemoryRepository, NodeIndex, RepositoryError};
use skos_model::{normalize_uri, Uri};
use skos_tree::{ToggleOutcome, TreeDataSource, TreeError};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::config::{ConfigError, ExplorerConfig};
use crate::debug::DebugHandle;
use crate::graphql::GraphqlRepository;
use crate::panel::ContentPanel;
use crate::scene::ExplorerScene;

/// Explorer errors
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// Constructed outside a tokio runtime
    #[error("explorer requires a tokio runtime")]
    NoRuntime,

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Repository could not be created
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Index operation failed
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Tree operation failed
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// URI is not shown in the tree
    #[error("not visible in tree: {0}")]
    NotVisible(String),
}

/// Result type alias for explorer operations
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Build the repository a configuration asks for
///
/// A fixture document takes precedence over an endpoint.
///
/// # Errors
/// - [`ConfigError::Io`] if the fixture cannot be read
/// - [`RepositoryError`] if the fixture does not decode or no source is set
pub fn repository_from_config(config: &ExplorerConfig) -> ExplorerResult<Arc<dyn ConceptRepository>> {
    if let Some(path) = &config.fixture {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let repo = InMemoryRepository::from_json(&text)?;
        tracing::info!(path = %path.display(), concepts = repo.concept_count(), "using fixture repository");
        return Ok(Arc::new(repo));
    }

    let repo = GraphqlRepository::from_config(config)?;
    tracing::info!(endpoint = repo.endpoint(), "using graphql repository");
    Ok(Arc::new(repo))
}

/// The wired explorer
pub struct Explorer {
    config: ExplorerConfig,
    index: Arc<NodeIndex>,
    tree: Arc<TreeDataSource>,
    selection: SelectionChannel,
    bus: InteractionBus,
    panel: Arc<ContentPanel>,
    scene: Arc<ExplorerScene>,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("index", &self.index)
            .field("tree", &self.tree)
            .field("selection", &self.selection.current())
            .finish_non_exhaustive()
    }
}

impl Explorer {
    /// Wire all components over a repository
    ///
    /// Must be called from within a tokio runtime; background detail loads
    /// are spawned on it.
    ///
    /// # Errors
    /// Returns [`ExplorerError::NoRuntime`] outside a runtime.
    pub fn new(repository: Arc<dyn ConceptRepository>, config: ExplorerConfig) -> ExplorerResult<Self> {
        let runtime = Handle::try_current().map_err(|_| ExplorerError::NoRuntime)?;

        let index = Arc::new(NodeIndex::new(repository));
        let tree = Arc::new(TreeDataSource::with_order(Arc::clone(&index), config.child_order));
        let selection = SelectionChannel::new();
        let bus = InteractionBus::new();

        let panel = ContentPanel::attach(Arc::clone(&index), &selection, runtime.clone());
        let scene = ExplorerScene::attach(Arc::clone(&index), bus.clone(), runtime);

        let follow = selection.clone();
        let picks = bus.subscribe_kinds(&[InteractionKind::ExplorerSelect], move |event| {
            follow.select(event.uri.clone());
        });

        Ok(Self {
            config,
            index,
            tree,
            selection,
            bus,
            panel,
            scene,
            subscriptions: vec![picks],
        })
    }

    /// Wire all components from configuration
    ///
    /// # Errors
    /// Returns [`ExplorerError`] if the configuration is invalid or names no
    /// usable repository.
    pub fn from_config(config: ExplorerConfig) -> ExplorerResult<Self> {
        config.validate()?;
        let repository = repository_from_config(&config)?;
        Self::new(repository, config)
    }

    /// Load the concept schemes and show them as tree roots
    ///
    /// # Errors
    /// Returns [`ExplorerError::Index`] if the scheme listing fails.
    pub async fn init(&self) -> ExplorerResult<Vec<Uri>> {
        let roots = self.index.load_roots().await?;
        self.tree.set_roots(roots.iter().cloned());
        tracing::info!(roots = roots.len(), "explorer initialised");
        Ok(roots)
    }

    /// Select a node from the tree
    pub fn select_from_tree(&self, uri: impl Into<Uri>) {
        let uri = uri.into();
        self.selection.select(uri.clone());
        self.bus.emit(InteractionEvent::new(
            InteractionKind::TreeSelect,
            EventSource::Tree,
            uri,
        ));
    }

    /// Announce a hover change
    pub fn hover(&self, source: EventSource, uri: impl Into<Uri>, entered: bool) {
        let kind = if entered {
            InteractionKind::HoverEnter
        } else {
            InteractionKind::HoverExit
        };
        self.bus.emit(InteractionEvent::new(kind, source, uri));
    }

    /// Expand the first visible row showing `uri`
    ///
    /// The URI is normalized first.
    ///
    /// # Errors
    /// - [`ExplorerError::NotVisible`] if no row shows the URI
    /// - [`ExplorerError::Tree`] if the children fetch fails
    pub async fn expand(&self, uri: &str) -> ExplorerResult<ToggleOutcome> {
        self.toggle_uri(uri, true).await
    }

    /// Collapse the first visible row showing `uri`
    ///
    /// # Errors
    /// Returns [`ExplorerError::NotVisible`] if no row shows the URI.
    pub async fn collapse(&self, uri: &str) -> ExplorerResult<ToggleOutcome> {
        self.toggle_uri(uri, false).await
    }

    async fn toggle_uri(&self, uri: &str, expand: bool) -> ExplorerResult<ToggleOutcome> {
        let uri = normalize_uri(uri).ok_or_else(|| ExplorerError::NotVisible(uri.to_string()))?;
        let row = self
            .tree
            .find_by_uri(&uri)
            .ok_or_else(|| ExplorerError::NotVisible(uri.to_string()))?;
        Ok(self.tree.toggle(row.id, expand).await?)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Shared index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<NodeIndex> {
        &self.index
    }

    /// Tree data source
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &Arc<TreeDataSource> {
        &self.tree
    }

    /// Selection channel
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &SelectionChannel {
        &self.selection
    }

    /// Interaction bus
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &InteractionBus {
        &self.bus
    }

    /// Detail panel
    #[inline]
    #[must_use]
    pub fn panel(&self) -> &Arc<ContentPanel> {
        &self.panel
    }

    /// Spatial scene
    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Arc<ExplorerScene> {
        &self.scene
    }

    /// Introspection handle
    #[must_use]
    pub fn debug_handle(&self) -> DebugHandle {
        DebugHandle {
            index: Arc::clone(&self.index),
            tree: Arc::clone(&self.tree),
            selection: self.selection.clone(),
            bus: self.bus.clone(),
            panel: Arc::clone(&self.panel),
            scene: Arc::clone(&self.scene),
        }
    }
}

impl Drop for Explorer {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.panel.detach();
        self.scene.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_runtime() {
        let result = Explorer::new(Arc::new(InMemoryRepository::new()), ExplorerConfig::new());
        assert!(matches!(result, Err(ExplorerError::NoRuntime)));
    }

    #[test]
    fn config_without_source_fails() {
        let Err(err) = repository_from_config(&ExplorerConfig::new()) else {
            panic!("repository built without a source");
        };
        assert!(matches!(err, ExplorerError::Repository(RepositoryError::Unavailable(_))));
    }

    #[test]
    fn missing_fixture_is_config_error() {
        let config = ExplorerConfig::new().with_fixture("/nonexistent/taxonomy.json");
        let Err(err) = repository_from_config(&config) else {
            panic!("repository built from a missing fixture");
        };
        assert!(matches!(err, ExplorerError::Config(ConfigError::Io { .. })));
    }
}

//! Tree data source
//!
//! Owns the ordered sequence of visible rows and applies expand/collapse
//! transitions, resolving children through the shared [`NodeIndex`].
//!
//! Each expand that has to wait for the index takes a load ticket. When the
//! resolution arrives, the row must still hold the same ticket; a collapse,
//! a removed ancestor or a newer expand all invalidate it, and the late
//! resolution is dropped.

use parking_lot::Mutex;
use skos_events::{Subject, Subscription};
use skos_index::NodeIndex;
use skos_model::{sort_children, ChildOrder, Uri};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{TreeError, TreeResult};
use crate::row::{FlatRow, RowId, RowState};

/// Result of a [`TreeDataSource::toggle`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Children inserted below the row
    Expanded {
        /// Number of rows inserted
        inserted: usize,
    },
    /// Descendant rows removed
    Collapsed {
        /// Number of rows removed
        removed: usize,
    },
    /// Row was already in the requested state, or already loading
    Ignored,
    /// Resolution arrived after the row was collapsed or removed
    Stale,
    /// Node has no children path (unknown or unrecognised kind)
    NoChildren,
}

#[derive(Debug, Default)]
struct TreeState {
    rows: Vec<FlatRow>,
    next_row: u64,
    next_ticket: u64,

    /// Parent URI -> ordered children, for rows currently expanded
    children: HashMap<Uri, Vec<Uri>>,

    /// Row -> ticket of its outstanding load
    pending: HashMap<RowId, u64>,
}

impl TreeState {
    fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    fn allocate(&mut self) -> RowId {
        let id = RowId(self.next_row);
        self.next_row += 1;
        id
    }

    /// End (exclusive) of the contiguous descendant block after `pos`
    fn block_end(&self, pos: usize) -> usize {
        let level = self.rows[pos].level;
        self.rows[pos + 1..]
            .iter()
            .position(|row| row.level <= level)
            .map_or(self.rows.len(), |offset| pos + 1 + offset)
    }
}

/// Flattened, lazily expanded view of the taxonomy
///
/// Rows are identified by [`RowId`], never by URI. All mutation happens
/// under a short lock; no lock is held while children are being fetched.
pub struct TreeDataSource {
    index: Arc<NodeIndex>,
    order: ChildOrder,
    state: Mutex<TreeState>,
    changes: Subject<Arc<[FlatRow]>>,
}

impl std::fmt::Debug for TreeDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TreeDataSource")
            .field("order", &self.order)
            .field("rows", &state.rows.len())
            .field("pending", &state.pending.len())
            .finish_non_exhaustive()
    }
}

impl TreeDataSource {
    /// Create empty tree over an index, children sorted by URI
    #[must_use]
    pub fn new(index: Arc<NodeIndex>) -> Self {
        Self::with_order(index, ChildOrder::default())
    }

    /// Create empty tree with an explicit child order
    #[must_use]
    pub fn with_order(index: Arc<NodeIndex>, order: ChildOrder) -> Self {
        Self {
            index,
            order,
            state: Mutex::new(TreeState::default()),
            changes: Subject::new(),
        }
    }

    /// Shared index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<NodeIndex> {
        &self.index
    }

    /// Configured child order
    #[inline]
    #[must_use]
    pub fn order(&self) -> ChildOrder {
        self.order
    }

    /// Replace the sequence with one collapsed level-0 row per root
    ///
    /// Clears cached child lists and invalidates every pending load.
    pub fn set_roots<I>(&self, roots: I)
    where
        I: IntoIterator<Item = Uri>,
    {
        let snapshot = {
            let mut state = self.state.lock();
            state.children.clear();
            state.pending.clear();
            state.rows.clear();

            for uri in roots {
                let id = state.allocate();
                let expandable = self.index.has_children(&uri);
                state.rows.push(FlatRow::new(id, uri, 0, expandable));
            }

            tracing::debug!(rows = state.rows.len(), "roots set");
            Self::snapshot(&state)
        };
        self.changes.emit(snapshot);
    }

    /// Expand or collapse a row
    ///
    /// # Errors
    /// - [`TreeError::UnknownRow`] if the row is not visible
    /// - [`TreeError::Index`] if children could not be fetched; the row is
    ///   left collapsed and nothing is inserted
    pub async fn toggle(&self, id: RowId, expand: bool) -> TreeResult<ToggleOutcome> {
        if expand {
            self.expand(id).await
        } else {
            self.collapse(id)
        }
    }

    async fn expand(&self, id: RowId) -> TreeResult<ToggleOutcome> {
        let (uri, ticket) = {
            let mut state = self.state.lock();
            let pos = state.position(id).ok_or(TreeError::UnknownRow(id))?;
            if state.rows[pos].state != RowState::Collapsed {
                tracing::debug!(row = %id, "expand ignored, row busy or expanded");
                return Ok(ToggleOutcome::Ignored);
            }

            let uri = state.rows[pos].item.clone();
            if let Some(children) = state.children.get(&uri).cloned() {
                tracing::debug!(uri = %uri, "children from tree cache");
                let inserted = self.splice(&mut state, pos, children);
                let snapshot = Self::snapshot(&state);
                drop(state);
                self.changes.emit(snapshot);
                return Ok(ToggleOutcome::Expanded { inserted });
            }

            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.pending.insert(id, ticket);
            state.rows[pos].state = RowState::Loading;
            (uri, ticket)
        };
        self.emit_current();

        let resolved = self.index.get_children(&uri).await;

        let mut state = self.state.lock();
        if state.pending.get(&id) != Some(&ticket) {
            tracing::debug!(row = %id, uri = %uri, "discarding stale children resolution");
            return Ok(ToggleOutcome::Stale);
        }
        state.pending.remove(&id);
        let Some(pos) = state.position(id) else {
            return Ok(ToggleOutcome::Stale);
        };

        let outcome = match resolved {
            Err(error) => {
                state.rows[pos].state = RowState::Collapsed;
                tracing::warn!(uri = %uri, error = %error, "failed to load children");
                Err(TreeError::Index(error))
            }
            Ok(None) => {
                state.rows[pos].state = RowState::Collapsed;
                Ok(ToggleOutcome::NoChildren)
            }
            Ok(Some(mut children)) => {
                let index = &self.index;
                sort_children(self.order, &mut children, |child| index.label_of(child));
                let inserted = self.splice(&mut state, pos, children);
                Ok(ToggleOutcome::Expanded { inserted })
            }
        };

        let snapshot = Self::snapshot(&state);
        drop(state);
        self.changes.emit(snapshot);
        outcome
    }

    /// Insert child rows after `pos` and mark the row expanded
    fn splice(&self, state: &mut TreeState, pos: usize, children: Vec<Uri>) -> usize {
        let level = state.rows[pos].level + 1;
        let mut block = Vec::with_capacity(children.len());
        for child in &children {
            let id = state.allocate();
            block.push(FlatRow::new(id, child.clone(), level, self.index.has_children(child)));
        }

        let inserted = block.len();
        state.rows.splice(pos + 1..pos + 1, block);
        state.rows[pos].state = RowState::Expanded;
        let uri = state.rows[pos].item.clone();
        tracing::debug!(uri = %uri, inserted, "rows inserted");
        state.children.insert(uri, children);
        inserted
    }

    fn collapse(&self, id: RowId) -> TreeResult<ToggleOutcome> {
        let mut state = self.state.lock();
        let pos = state.position(id).ok_or(TreeError::UnknownRow(id))?;

        let removed = match state.rows[pos].state {
            RowState::Collapsed => return Ok(ToggleOutcome::Ignored),
            RowState::Loading => {
                state.pending.remove(&id);
                0
            }
            RowState::Expanded => {
                let end = state.block_end(pos);
                let gone: Vec<FlatRow> = state.rows.drain(pos + 1..end).collect();
                for row in &gone {
                    state.pending.remove(&row.id);
                    state.children.remove(&row.item);
                }
                let uri = state.rows[pos].item.clone();
                state.children.remove(&uri);
                gone.len()
            }
        };
        state.rows[pos].state = RowState::Collapsed;
        tracing::debug!(row = %id, removed, "row collapsed");

        let snapshot = Self::snapshot(&state);
        drop(state);
        self.changes.emit(snapshot);
        Ok(ToggleOutcome::Collapsed { removed })
    }

    fn snapshot(state: &TreeState) -> Arc<[FlatRow]> {
        Arc::from(state.rows.as_slice())
    }

    fn emit_current(&self) {
        let snapshot = Self::snapshot(&self.state.lock());
        self.changes.emit(snapshot);
    }

    /// Snapshot of the visible sequence
    #[must_use]
    pub fn rows(&self) -> Vec<FlatRow> {
        self.state.lock().rows.clone()
    }

    /// Row by id
    #[must_use]
    pub fn row(&self, id: RowId) -> Option<FlatRow> {
        let state = self.state.lock();
        state.position(id).map(|pos| state.rows[pos].clone())
    }

    /// First visible row showing `uri`
    #[must_use]
    pub fn find_by_uri(&self, uri: &str) -> Option<FlatRow> {
        self.state
            .lock()
            .rows
            .iter()
            .find(|row| row.item.as_str() == uri)
            .cloned()
    }

    /// Number of visible rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().rows.len()
    }

    /// Check if no rows are visible
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().rows.is_empty()
    }

    /// Observe the visible sequence
    ///
    /// The handler receives the current sequence at once if roots were set,
    /// and a fresh snapshot after every change.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&[FlatRow]) + Send + Sync + 'static,
    {
        self.changes.subscribe(move |rows| handler(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skos_index::InMemoryRepository;
    use skos_model::{ConceptNode, ConceptSchemeNode};

    fn shape(tree: &TreeDataSource) -> Vec<(String, usize, bool)> {
        tree.rows()
            .into_iter()
            .map(|row| (row.item.to_string(), row.level, row.is_expandable))
            .collect()
    }

    async fn tree_over(repo: InMemoryRepository, order: ChildOrder) -> TreeDataSource {
        let index = Arc::new(NodeIndex::new(Arc::new(repo)));
        let roots = index.load_roots().await.unwrap();
        let tree = TreeDataSource::with_order(index, order);
        tree.set_roots(roots);
        tree
    }

    fn unordered_repo() -> InMemoryRepository {
        InMemoryRepository::new().with_scheme(
            ConceptSchemeNode::new("S", "Scheme").with_top_concepts(vec![
                ConceptNode::new("c", "alpha"),
                ConceptNode::new("a", "gamma"),
                ConceptNode::new("b", "beta"),
            ]),
        )
    }

    #[tokio::test]
    async fn children_sorted_by_uri_by_default() {
        let tree = tree_over(unordered_repo(), ChildOrder::default()).await;
        let root = tree.rows()[0].id;
        tree.toggle(root, true).await.unwrap();

        let items: Vec<String> = tree.rows().iter().map(|r| r.item.to_string()).collect();
        assert_eq!(items, vec!["S", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn children_sorted_by_label_on_request() {
        let tree = tree_over(unordered_repo(), ChildOrder::LabelAscending).await;
        let root = tree.rows()[0].id;
        tree.toggle(root, true).await.unwrap();

        let items: Vec<String> = tree.rows().iter().map(|r| r.item.to_string()).collect();
        assert_eq!(items, vec!["S", "c", "b", "a"]);
    }

    #[tokio::test]
    async fn repeated_expand_is_ignored() {
        let tree = tree_over(unordered_repo(), ChildOrder::Resolved).await;
        let root = tree.rows()[0].id;

        assert_eq!(
            tree.toggle(root, true).await.unwrap(),
            ToggleOutcome::Expanded { inserted: 3 }
        );
        assert_eq!(tree.toggle(root, true).await.unwrap(), ToggleOutcome::Ignored);
        assert_eq!(tree.len(), 4);
    }

    #[tokio::test]
    async fn collapse_of_collapsed_row_is_ignored() {
        let tree = tree_over(unordered_repo(), ChildOrder::Resolved).await;
        let root = tree.rows()[0].id;
        assert_eq!(tree.toggle(root, false).await.unwrap(), ToggleOutcome::Ignored);
    }

    #[tokio::test]
    async fn unknown_row_is_an_error() {
        let tree = tree_over(unordered_repo(), ChildOrder::Resolved).await;
        let err = tree.toggle(RowId(999), true).await.unwrap_err();
        assert!(matches!(err, TreeError::UnknownRow(RowId(999))));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn collapse_removes_nested_block() {
        let repo = InMemoryRepository::new()
            .with_scheme(
                ConceptSchemeNode::new("S", "S").with_top_concepts(vec![ConceptNode::new("c", "c")]),
            )
            .with_scheme(ConceptSchemeNode::new("T", "T"))
            .with_concept(ConceptNode::new("c", "c"))
            .with_concept(ConceptNode::new("c1", "c1").with_broader(vec![ConceptNode::new("c", "")]));
        let tree = tree_over(repo, ChildOrder::default()).await;

        let s = tree.rows()[0].id;
        tree.toggle(s, true).await.unwrap();
        let c = tree.find_by_uri("c").unwrap().id;
        tree.toggle(c, true).await.unwrap();
        assert_eq!(tree.len(), 4);

        assert_eq!(
            tree.toggle(s, false).await.unwrap(),
            ToggleOutcome::Collapsed { removed: 2 }
        );
        assert_eq!(
            shape(&tree),
            vec![("S".to_string(), 0, true), ("T".to_string(), 0, false)]
        );
    }

    #[tokio::test]
    async fn collapse_drops_cache_of_removed_descendants() {
        let repo = InMemoryRepository::new()
            .with_scheme(
                ConceptSchemeNode::new("S", "S").with_top_concepts(vec![ConceptNode::new("c", "c")]),
            )
            .with_concept(ConceptNode::new("c", "c"))
            .with_concept(ConceptNode::new("c1", "c1").with_broader(vec![ConceptNode::new("c", "")]));
        let tree = tree_over(repo, ChildOrder::default()).await;

        let s = tree.rows()[0].id;
        tree.toggle(s, true).await.unwrap();
        let c = tree.find_by_uri("c").unwrap().id;
        tree.toggle(c, true).await.unwrap();
        assert!(tree.state.lock().children.contains_key("c"));

        tree.toggle(s, false).await.unwrap();
        assert!(tree.state.lock().children.is_empty());

        // the descendant comes back collapsed and loads through the index
        tree.toggle(s, true).await.unwrap();
        let c = tree.find_by_uri("c").unwrap();
        assert_eq!(c.state, RowState::Collapsed);
        assert_eq!(
            tree.toggle(c.id, true).await.unwrap(),
            ToggleOutcome::Expanded { inserted: 1 }
        );
        assert_eq!(tree.len(), 3);
    }

    #[tokio::test]
    async fn subscribers_see_snapshots() {
        let tree = tree_over(unordered_repo(), ChildOrder::Resolved).await;
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = sizes.clone();
        tree.subscribe(move |rows| sink.lock().push(rows.len()));

        let root = tree.rows()[0].id;
        tree.toggle(root, true).await.unwrap();
        tree.toggle(root, false).await.unwrap();

        // replay, loading, expanded, collapsed
        assert_eq!(*sizes.lock(), vec![1, 1, 4, 1]);
    }

    #[tokio::test]
    async fn set_roots_resets_rows() {
        let tree = tree_over(unordered_repo(), ChildOrder::Resolved).await;
        let root = tree.rows()[0].id;
        tree.toggle(root, true).await.unwrap();

        tree.set_roots(vec![Uri::new("S")]);
        assert_eq!(tree.len(), 1);
        assert!(tree.row(root).is_none());
        assert_eq!(tree.rows()[0].state, RowState::Collapsed);
    }
}

//! Flattened rows

use serde::Serialize;
use skos_model::Uri;
use std::fmt;

/// Row identity, unique for the lifetime of a [`TreeDataSource`](crate::TreeDataSource)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(pub(crate) u64);

impl RowId {
    /// Numeric value
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// Expansion state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    /// No children shown
    #[default]
    Collapsed,
    /// Children are being resolved
    Loading,
    /// Children shown directly below
    Expanded,
}

/// One visible tree node at an indentation level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    /// Row identity
    pub id: RowId,
    /// Node URI
    pub item: Uri,
    /// Depth, 0 for roots
    pub level: usize,
    /// Whether the row offers expansion
    pub is_expandable: bool,
    /// Expansion state
    pub state: RowState,
}

impl FlatRow {
    pub(crate) fn new(id: RowId, item: Uri, level: usize, is_expandable: bool) -> Self {
        Self {
            id,
            item,
            level,
            is_expandable,
            state: RowState::Collapsed,
        }
    }

    /// True only while children are being fetched
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == RowState::Loading
    }

    /// Children are shown
    #[inline]
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.state == RowState::Expanded
    }
}

impl fmt::Display for FlatRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match (self.state, self.is_expandable) {
            (RowState::Expanded, _) => "-",
            (RowState::Loading, _) => "~",
            (RowState::Collapsed, true) => "+",
            (RowState::Collapsed, false) => " ",
        };
        write!(f, "{:indent$}{marker} {}", "", self.item, indent = self.level * 2)
    }
}

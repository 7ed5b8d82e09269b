//! Error types for tree operations

use skos_index::IndexError;

use crate::row::RowId;

/// Tree operation errors
///
/// A resolution arriving for a row that was collapsed or removed meanwhile
/// is not an error; see [`ToggleOutcome::Stale`](crate::ToggleOutcome::Stale).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TreeError {
    /// Row id is not in the visible sequence
    #[error("unknown row: {0}")]
    UnknownRow(RowId),

    /// Children could not be resolved
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl TreeError {
    /// Check if retrying the toggle may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UnknownRow(_) => false,
            Self::Index(e) => e.is_retryable(),
        }
    }
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

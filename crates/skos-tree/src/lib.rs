//! SKOS Tree Data Source
//!
//! Presents the taxonomy as a flat, indentation-levelled list of rows that
//! grows and shrinks as rows are expanded and collapsed.
//!
//! # Overview
//!
//! - **FlatRow**: one visible node with its level and expansion state
//! - **TreeDataSource**: the ordered row sequence and its transitions
//!
//! Children of an expanded row always form a contiguous block directly
//! below it. Resolutions that arrive after their row was collapsed are
//! discarded.
//!
//! # Example
//!
//! ```rust
//! use skos_index::{InMemoryRepository, NodeIndex};
//! use skos_model::{ConceptNode, ConceptSchemeNode};
//! use skos_tree::TreeDataSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = InMemoryRepository::new()
//!     .with_scheme(ConceptSchemeNode::new("s", "Scheme")
//!         .with_top_concepts(vec![ConceptNode::new("c", "Concept")]));
//! let index = Arc::new(NodeIndex::new(Arc::new(repo)));
//!
//! let tree = TreeDataSource::new(index.clone());
//! tree.set_roots(index.load_roots().await?);
//!
//! let root = tree.rows()[0].id;
//! tree.toggle(root, true).await?;
//! assert_eq!(tree.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod row;
pub mod source;

// Re-exports
pub use error::{TreeError, TreeResult};
pub use row::{FlatRow, RowId, RowState};
pub use source::{ToggleOutcome, TreeDataSource};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for tree operations
    pub use crate::{FlatRow, RowId, RowState, ToggleOutcome, TreeDataSource, TreeError};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! SKOS Node Index
//!
//! Incremental, shared store of taxonomy nodes and their child lists.
//!
//! # Overview
//!
//! - **ConceptRepository**: the external source of records (GraphQL, memory)
//! - **NodeIndex**: URI → node and URI → child URIs, loaded on demand
//! - **InMemoryRepository**: repository backed by a JSON taxonomy document
//!
//! Children of concepts are fetched lazily and exactly once; children of
//! concept schemes come from the top concepts delivered with the roots.
//!
//! # Example
//!
//! ```rust
//! use skos_index::{InMemoryRepository, NodeIndex};
//! use skos_model::{ConceptNode, ConceptSchemeNode};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), skos_index::IndexError> {
//! let repo = InMemoryRepository::new()
//!     .with_scheme(ConceptSchemeNode::new("s", "Scheme")
//!         .with_top_concepts(vec![ConceptNode::new("c", "Concept")]));
//! let index = NodeIndex::new(Arc::new(repo));
//!
//! let roots = index.load_roots().await?;
//! let children = index.get_children(&roots[0]).await?;
//! assert_eq!(children.map(|c| c.len()), Some(1));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod index;
pub mod repository;

// Re-exports
pub use error::{IndexError, IndexResult, RepositoryError};
pub use index::{IndexStats, NodeIndex};
pub use repository::{ConceptRepository, InMemoryRepository};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for index operations
    pub use crate::{
        ConceptRepository, InMemoryRepository, IndexError, IndexStats, NodeIndex, RepositoryError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

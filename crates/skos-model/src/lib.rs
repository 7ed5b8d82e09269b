//! SKOS Explorer Model
//!
//! Shared data model for the taxonomy explorer.
//!
//! # Core Concepts
//!
//! - [`Uri`]: cheap-to-clone node identifier, ordered lexicographically
//! - [`NodeKind`]: closed discriminator fixed when a node is constructed
//! - [`RdfNode`], [`ConceptNode`], [`ConceptSchemeNode`]: typed taxonomy entries
//! - [`IndexedNode`]: the value stored per URI by the node index
//! - [`ChildOrder`]: total order applied to resolved children
//! - [`wire`]: GraphQL-shaped records and their conversion into the model
//!
//! # Example
//!
//! ```rust
//! use skos_model::{ConceptNode, NodeKind, Uri};
//!
//! let concept = ConceptNode::new("http://example.org/c/1", "Water");
//! assert_eq!(concept.kind(), NodeKind::Concept);
//! assert_eq!(concept.uri(), &Uri::new("http://example.org/c/1"));
//! ```

#![warn(unreachable_pub)]

mod node;
mod order;
mod uri;
pub mod wire;

pub use node::{ConceptNode, ConceptSchemeNode, IndexedNode, Literal, NodeKind, RdfNode, TypeRef};
pub use order::{sort_children, ChildOrder};
pub use uri::{display_label, local_name, normalize_uri, Uri};

/// SKOS core namespace
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with taxonomy nodes
    pub use crate::{
        ChildOrder, ConceptNode, ConceptSchemeNode, IndexedNode, Literal, NodeKind, RdfNode,
        TypeRef, Uri,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

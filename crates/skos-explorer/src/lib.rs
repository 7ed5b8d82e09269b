//! SKOS Taxonomy Explorer
//!
//! Wires the node index, the lazy tree, the detail panel and the spatial
//! scene together, and provides the GraphQL backend and configuration.
//!
//! # Overview
//!
//! - **Explorer**: owns every component and routes selections between them
//! - **ContentPanel**: full record of the selected concept or scheme
//! - **ExplorerScene**: scheme-centred scene reacting to tree selections
//! - **GraphqlRepository**: the three fixed queries over HTTP
//! - **ExplorerConfig**: TOML configuration
//! - **DebugHandle**: explicit introspection of all of the above
//!
//! # Example
//!
//! ```rust,no_run
//! use skos_explorer::{Explorer, ExplorerConfig};
//!
//! # async fn example() -> Result<(), skos_explorer::ExplorerError> {
//! let config = ExplorerConfig::new().with_endpoint("https://example.org/graphql");
//! let explorer = Explorer::from_config(config)?;
//!
//! let roots = explorer.init().await?;
//! explorer.expand(roots[0].as_str()).await?;
//! explorer.select_from_tree(roots[0].clone());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod debug;
pub mod explorer;
pub mod graphql;
pub mod panel;
pub mod scene;

// Re-exports
pub use config::{ConfigError, ExplorerConfig};
pub use debug::{DebugHandle, DebugSnapshot};
pub use explorer::{repository_from_config, Explorer, ExplorerError, ExplorerResult};
pub use graphql::GraphqlRepository;
pub use panel::{ContentPanel, PanelState};
pub use scene::{Arrangement, ExplorerScene, SceneSnapshot};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the explorer
    pub use crate::{
        Arrangement, ContentPanel, DebugHandle, Explorer, ExplorerConfig, ExplorerError,
        ExplorerScene, GraphqlRepository, PanelState,
    };
    pub use skos_events::prelude::*;
    pub use skos_model::prelude::*;
    pub use skos_tree::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

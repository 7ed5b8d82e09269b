//! SKOS Explorer Events
//!
//! Publish/subscribe primitives connecting the tree, the detail panel and
//! the spatial explorer.
//!
//! # Overview
//!
//! - **Subject**: observer list replaying its latest value to late subscribers
//! - **SelectionChannel**: the single current selection
//! - **InteractionBus**: hover and select events tagged with their source
//!
//! Delivery is synchronous. Handlers needing async work spawn it and deal
//! with its errors themselves.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod interaction;
pub mod selection;
pub mod subject;

// Re-exports
pub use interaction::{EventSource, InteractionBus, InteractionEvent, InteractionKind};
pub use selection::SelectionChannel;
pub use subject::{Subject, Subscription};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for event wiring
    pub use crate::{
        EventSource, InteractionBus, InteractionEvent, InteractionKind, SelectionChannel,
        Subscription,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Child ordering
//!
//! Repositories return children in whatever order the backend produces.
//! [`ChildOrder`] picks a total order so that presentation is reproducible.

use serde::{Deserialize, Serialize};

use crate::uri::Uri;

/// Order applied to resolved children before they become rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// Keep the repository's order
    Resolved,

    /// Ascending lexicographic URI order
    #[default]
    UriAscending,

    /// Case-insensitive label order, URI ascending as tie-break
    LabelAscending,
}

/// Sort child URIs in place
///
/// `label_of` resolves a display label; `None` falls back to the URI's local
/// name. Sorting is stable, so `Resolved` and equal keys keep their input
/// order.
pub fn sort_children<F>(order: ChildOrder, uris: &mut [Uri], label_of: F)
where
    F: Fn(&Uri) -> Option<String>,
{
    match order {
        ChildOrder::Resolved => {}
        ChildOrder::UriAscending => uris.sort(),
        ChildOrder::LabelAscending => uris.sort_by_cached_key(|uri| {
            let label = label_of(uri).unwrap_or_else(|| uri.local_name().to_string());
            (label.to_lowercase(), uri.clone())
        }),
    }
}

//! Error types for the node index
//!
//! Provides error handling for:
//! - Repository calls (transport, GraphQL, decoding)
//! - Index fetches, which wrap the repository error with the URI involved

use skos_model::Uri;
use std::sync::Arc;

/// Errors reported by a [`ConceptRepository`](crate::ConceptRepository)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Request never produced a response (connection, timeout, HTTP status)
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with GraphQL errors and no data
    #[error("graphql errors: {}", .0.join("; "))]
    Graphql(Vec<String>),

    /// Response body did not have the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Repository cannot serve requests at all
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Check if the caller may reasonably retry
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable(_))
    }
}

/// Errors from [`NodeIndex`](crate::NodeIndex) operations
///
/// The repository error is shared because a single failed fetch may be
/// reported to several coalesced callers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// Concept scheme listing failed
    #[error("failed to load roots: {source}")]
    Roots {
        /// Underlying repository error
        #[source]
        source: Arc<RepositoryError>,
    },

    /// Children fetch failed
    #[error("failed to load children of {uri}: {source}")]
    Children {
        /// Parent URI
        uri: Uri,
        /// Underlying repository error
        #[source]
        source: Arc<RepositoryError>,
    },

    /// Detail fetch failed
    #[error("failed to load concept {uri}: {source}")]
    Detail {
        /// Concept URI
        uri: Uri,
        /// Underlying repository error
        #[source]
        source: Arc<RepositoryError>,
    },
}

impl IndexError {
    /// Underlying repository error
    #[must_use]
    pub fn repository_error(&self) -> &RepositoryError {
        match self {
            Self::Roots { source } | Self::Children { source, .. } | Self::Detail { source, .. } => {
                source
            }
        }
    }

    /// Check if the failed operation may be retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.repository_error().is_retryable()
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_error_display() {
        let err = RepositoryError::Graphql(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "graphql errors: a; b");
    }

    #[test]
    fn retryable_classification() {
        assert!(RepositoryError::Transport("reset".into()).is_retryable());
        assert!(RepositoryError::Unavailable("down".into()).is_retryable());
        assert!(!RepositoryError::Decode("bad".into()).is_retryable());
        assert!(!RepositoryError::Graphql(vec![]).is_retryable());
    }

    #[test]
    fn index_error_wraps_uri() {
        let err = IndexError::Children {
            uri: Uri::new("http://example.org/c/1"),
            source: Arc::new(RepositoryError::Transport("timeout".into())),
        };
        assert!(err.to_string().contains("http://example.org/c/1"));
        assert!(err.is_retryable());
    }
}

//! Explorer configuration
//!
//! Loaded from TOML; every field has a default so a partial file is valid.
//!
//! ```toml
//! endpoint = "https://example.org/graphql"
//! root_limit = 100
//! child_order = "label_ascending"
//! request_timeout_secs = 10
//! log_filter = "skos_index=debug,info"
//! ```

use serde::{Deserialize, Serialize};
use skos_model::ChildOrder;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("failed to parse config {path}: {message}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Values are out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Explorer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    /// GraphQL endpoint URL
    pub endpoint: Option<String>,
    /// JSON taxonomy document used instead of an endpoint
    pub fixture: Option<PathBuf>,
    /// `first:` limit for the scheme listing
    pub root_limit: Option<u32>,
    /// `first:` limit for children listings
    pub child_limit: Option<u32>,
    /// Order applied to children in the tree
    pub child_order: ChildOrder,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Default tracing filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            fixture: None,
            root_limit: None,
            child_limit: None,
            child_order: ChildOrder::default(),
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read, parsed or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero timeout, a zero limit or
    /// an endpoint that is not an `http(s)` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.root_limit == Some(0) || self.child_limit == Some(0) {
            return Err(ConfigError::Invalid("limits must be positive".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let lower = endpoint.to_ascii_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "endpoint must be an http(s) URL: {endpoint}"
                )));
            }
        }
        Ok(())
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// With GraphQL endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// With fixture document
    #[must_use]
    pub fn with_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture = Some(path.into());
        self
    }

    /// With child order
    #[inline]
    #[must_use]
    pub fn with_child_order(mut self, order: ChildOrder) -> Self {
        self.child_order = order;
        self
    }

    /// With listing limits
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, roots: Option<u32>, children: Option<u32>) -> Self {
        self.root_limit = roots;
        self.child_limit = children;
        self
    }

    /// With request timeout in seconds
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With default log filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

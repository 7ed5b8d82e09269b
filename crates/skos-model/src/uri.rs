//! Node identifiers
//!
//! Provides [`Uri`] plus the normalization and display helpers used when
//! URIs arrive from user input or sparse records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::node::RdfNode;

/// Globally unique node identifier
///
/// Backed by a shared string so clones are a reference-count bump.
/// Hashing, equality and ordering match `str`, which lets maps keyed by
/// `Uri` be queried with a plain `&str`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uri(Arc<str>);

impl Uri {
    /// Create URI from string (taken verbatim)
    #[inline]
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path or fragment segment
    #[inline]
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.0)
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Uri({:?})", &*self.0)
    }
}

impl Display for Uri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Uri {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&Uri> for Uri {
    fn from(value: &Uri) -> Self {
        value.clone()
    }
}

impl Deref for Uri {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Uri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for Uri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Uri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Normalize a user-supplied URI
///
/// Trims whitespace, strips one pair of enclosing angle brackets and
/// lowercases the scheme and authority. Path, query and fragment are
/// case-sensitive and left alone.
///
/// Returns `None` when nothing is left.
#[must_use]
pub fn normalize_uri(raw: &str) -> Option<Uri> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed)
        .trim();

    if inner.is_empty() {
        return None;
    }

    let Some((scheme, rest)) = inner.split_once("://") else {
        return Some(Uri::new(inner));
    };

    let split_at = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(split_at);

    Some(Uri::from(format!(
        "{}://{}{}",
        scheme.to_ascii_lowercase(),
        authority.to_ascii_lowercase(),
        tail
    )))
}

/// Segment after the last `#`, or else after the last `/`
///
/// Trailing separators are ignored, so `http://x.org/a/b/` yields `b`.
#[must_use]
pub fn local_name(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches(|c: char| c == '/' || c == '#');
    let start = trimmed
        .rfind('#')
        .or_else(|| trimmed.rfind('/'))
        .map_or(0, |i| i + 1);
    &trimmed[start..]
}

/// Label to show for a node, falling back to the URI's local name
#[must_use]
pub fn display_label(node: &RdfNode) -> &str {
    let label = node.label.trim();
    if label.is_empty() {
        node.uri.local_name()
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn normalize_trims_and_strips_brackets() {
        let uri = normalize_uri("  <http://example.org/c/1>  ").unwrap();
        assert_eq!(uri.as_str(), "http://example.org/c/1");
    }

    #[test]
    fn normalize_lowercases_scheme_and_host_only() {
        let uri = normalize_uri("HTTP://Example.ORG/Concepts/Water#Top").unwrap();
        assert_eq!(uri.as_str(), "http://example.org/Concepts/Water#Top");
    }

    #[test]
    fn normalize_handles_bare_authority() {
        let uri = normalize_uri("HTTPS://Example.org").unwrap();
        assert_eq!(uri.as_str(), "https://example.org");
    }

    #[test]
    fn normalize_keeps_opaque_identifiers() {
        let uri = normalize_uri("urn:isbn:0451450523").unwrap();
        assert_eq!(uri.as_str(), "urn:isbn:0451450523");
    }

    #[test]
    fn normalize_rejects_empty() {
        assert!(normalize_uri("   ").is_none());
        assert!(normalize_uri("<>").is_none());
    }

    #[test]
    fn local_name_prefers_fragment() {
        assert_eq!(local_name("http://www.w3.org/2004/02/skos/core#Concept"), "Concept");
        assert_eq!(local_name("http://example.org/begrip/42"), "42");
        assert_eq!(local_name("http://example.org/begrip/42/"), "42");
        assert_eq!(local_name("plain"), "plain");
    }

    #[test]
    fn display_label_falls_back_to_local_name() {
        let node = RdfNode::new("http://example.org/begrip/water", "  ", Vec::new());
        assert_eq!(display_label(&node), "water");

        let node = RdfNode::new("http://example.org/begrip/water", "Water", Vec::new());
        assert_eq!(display_label(&node), "Water");
    }

    #[test]
    fn uri_map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Uri::new("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn uri_serde_is_transparent() {
        let uri = Uri::new("http://example.org/x");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"http://example.org/x\"");

        let back: Uri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }
}

//! Current-selection channel
//!
//! Holds the URI of the node the user last selected. Late subscribers
//! receive the current value on subscription.

use skos_model::Uri;

use crate::subject::{Subject, Subscription};

/// Shared "current selection" stream
///
/// Clones share the same channel.
#[derive(Debug, Clone, Default)]
pub struct SelectionChannel {
    subject: Subject<Option<Uri>>,
}

impl SelectionChannel {
    /// Create channel with nothing selected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a node
    ///
    /// Re-selecting the current URI emits again, which lets views reload.
    pub fn select(&self, uri: impl Into<Uri>) {
        let uri = uri.into();
        tracing::debug!(uri = %uri, "selection changed");
        self.subject.emit(Some(uri));
    }

    /// Clear the selection
    pub fn clear(&self) {
        tracing::debug!("selection cleared");
        self.subject.emit(None);
    }

    /// Currently selected URI
    #[must_use]
    pub fn current(&self) -> Option<Uri> {
        self.subject.latest().flatten()
    }

    /// Observe selection changes, `None` meaning cleared
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Option<&Uri>) + Send + Sync + 'static,
    {
        self.subject.subscribe(move |value| handler(value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder(channel: &SelectionChannel) -> Arc<Mutex<Vec<Option<String>>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        channel.subscribe(move |uri| sink.lock().push(uri.map(|u| u.to_string())));
        seen
    }

    #[test]
    fn late_subscriber_receives_current_selection() {
        let channel = SelectionChannel::new();
        channel.select("u1");
        channel.select("u2");

        let seen = recorder(&channel);
        assert_eq!(*seen.lock(), vec![Some("u2".to_string())]);
    }

    #[test]
    fn early_subscriber_sees_every_selection() {
        let channel = SelectionChannel::new();
        let seen = recorder(&channel);

        channel.select("u1");
        channel.select("u1");
        channel.clear();

        assert_eq!(
            *seen.lock(),
            vec![Some("u1".to_string()), Some("u1".to_string()), None]
        );
        assert_eq!(channel.current(), None);
    }

    #[test]
    fn clones_share_state() {
        let channel = SelectionChannel::new();
        let other = channel.clone();
        other.select("shared");
        assert_eq!(channel.current(), Some(Uri::new("shared")));
    }
}

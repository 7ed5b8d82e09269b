//! Replay-latest observer list

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    handlers: Vec<(u64, Handler<T>)>,
    latest: Option<T>,
    next_id: u64,
}

/// Observer list with synchronous fan-out and replay of the latest value
///
/// Handlers run on the emitting thread, in subscription order. The handler
/// list is snapshotted before fan-out and no lock is held while handlers
/// run, so a handler may emit or subscribe itself.
pub struct Subject<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                handlers: Vec::new(),
                latest: None,
                next_id: 0,
            })),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Subject")
            .field("subscribers", &inner.handlers.len())
            .field("has_latest", &inner.latest.is_some())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> {
    /// Create subject with no value
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value to every current subscriber
    pub fn emit(&self, value: T) {
        let handlers: Vec<Handler<T>> = {
            let mut inner = self.inner.lock();
            inner.latest = Some(value.clone());
            inner.handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
        };

        for handler in handlers {
            handler(&value);
        }
    }

    /// Most recently emitted value
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.inner.lock().latest.clone()
    }

    /// Register a handler
    ///
    /// If a value was emitted before, the handler receives it immediately.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let handler: Handler<T> = Arc::new(handler);
        let (id, replay) = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.handlers.push((id, Arc::clone(&handler)));
            (id, inner.latest.clone())
        };

        if let Some(value) = replay {
            handler(&value);
        }

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            id,
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().handlers.retain(|(hid, _)| *hid != id);
                }
            })),
        }
    }

    /// Number of registered handlers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }
}

/// Handle to a registered handler
///
/// Dropping the handle leaves the handler registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct Subscription {
    id: u64,
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Handler id, unique within its subject
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the handler
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fan_out_in_subscription_order() {
        let subject = Subject::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let log = log.clone();
            subject.subscribe(move |v: &u32| log.lock().push(format!("{name}:{v}")));
        }
        subject.emit(7);

        assert_eq!(*log.lock(), vec!["first:7", "second:7"]);
    }

    #[test]
    fn late_subscriber_gets_latest_only() {
        let subject = Subject::new();
        subject.emit(1);
        subject.emit(2);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        subject.subscribe(move |v: &u32| sink.lock().push(*v));

        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn no_replay_before_first_emit() {
        let subject: Subject<u32> = Subject::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        subject.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(subject.latest(), None);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let subject = Subject::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = subject.subscribe(move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subject.emit(1);
        sub.unsubscribe();
        subject.emit(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(subject.subscriber_count(), 0);
    }

    #[test]
    fn handler_may_emit_reentrantly() {
        let subject: Subject<u32> = Subject::new();
        let echo = subject.clone();
        subject.subscribe(move |v| {
            if *v < 3 {
                echo.emit(v + 1);
            }
        });

        subject.emit(0);
        assert_eq!(subject.latest(), Some(3));
    }
}

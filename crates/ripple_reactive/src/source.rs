//! The source/subscriber seam of the reactive graph.
//!
//! A [`Source`] is anything whose reads can be logged and whose changes can
//! be observed. A [`Subscriber`] is anything that wants to hear about those
//! changes. Sources only ever hold [`Weak`] references to subscribers, so a
//! subscription never keeps its subscriber alive.
//!
//! Subscriptions are represented by the RAII guard [`Subscription`]: dropping
//! the guard detaches the subscriber from the source.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a reactive source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Allocates a fresh identifier.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Identifier of one subscriber registration on one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Receives change notifications from the sources it subscribed to.
pub trait Subscriber: Send + Sync {
    /// Called after `source` changed. Never called with a source lock held.
    fn notify(&self, source: SourceId);
}

/// An observable reactive cell.
pub trait Source: Send + Sync {
    /// Returns this source's identifier.
    fn id(&self) -> SourceId;

    /// Registers a subscriber. Notifications go out in registration order.
    fn subscribe(&self, subscriber: Weak<dyn Subscriber>) -> SubscriptionId;

    /// Removes a previously registered subscriber. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

// ─────────────────────────────────────────────────────────────────────────────
// SubscriberList
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered subscriber registry backing a [`Source`] implementation.
#[derive(Default)]
pub struct SubscriberList {
    entries: Mutex<Vec<(SubscriptionId, Weak<dyn Subscriber>)>>,
}

impl SubscriberList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber and returns its registration id.
    pub fn add(&self, subscriber: Weak<dyn Subscriber>) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.entries.lock().push((id, subscriber));
        id
    }

    /// Removes the registration with the given id.
    pub fn remove(&self, id: SubscriptionId) {
        self.entries.lock().retain(|(entry, _)| *entry != id);
    }

    /// Returns the number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|(_, sub)| sub.strong_count() > 0)
            .count()
    }

    /// Returns `true` if there are no live registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifies every live subscriber, in registration order.
    ///
    /// Dead entries are pruned. The internal lock is released before any
    /// subscriber runs, so subscribers may freely subscribe or unsubscribe.
    pub fn notify_all(&self, source: SourceId) {
        let live: Vec<Arc<dyn Subscriber>> = {
            let mut entries = self.entries.lock();
            entries.retain(|(_, sub)| sub.strong_count() > 0);
            entries.iter().filter_map(|(_, sub)| sub.upgrade()).collect()
        };

        for subscriber in live {
            subscriber.notify(source);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subscription
// ─────────────────────────────────────────────────────────────────────────────

/// RAII guard for one subscriber registration.
///
/// Dropping the guard unsubscribes. The guard holds the source weakly, so it
/// never extends the source's lifetime.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    source: Weak<dyn Source>,
    source_id: SourceId,
    id: SubscriptionId,
}

impl Subscription {
    /// Subscribes `subscriber` to `source`.
    pub fn new(source: &Arc<dyn Source>, subscriber: Weak<dyn Subscriber>) -> Self {
        let id = source.subscribe(subscriber);
        Self {
            source: Arc::downgrade(source),
            source_id: source.id(),
            id,
        }
    }

    /// Returns the id of the source this subscription listens to.
    #[must_use]
    pub fn source_id(&self) -> SourceId {
        self.source_id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("source", &self.source_id)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    struct Counter(AtomicUsize);

    impl Subscriber for Counter {
        fn notify(&self, _source: SourceId) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn source_ids_are_unique() {
        let a = SourceId::next();
        let b = SourceId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn notify_all_skips_dropped_subscribers() {
        let list = SubscriberList::new();
        let alive = Arc::new(Counter(AtomicUsize::new(0)));
        let dead = Arc::new(Counter(AtomicUsize::new(0)));

        let alive_dyn: Arc<dyn Subscriber> = alive.clone();
        let dead_dyn: Arc<dyn Subscriber> = dead.clone();
        list.add(Arc::downgrade(&alive_dyn));
        list.add(Arc::downgrade(&dead_dyn));
        drop(dead_dyn);
        drop(dead);

        list.notify_all(SourceId::next());
        assert_eq!(alive.0.load(Ordering::SeqCst), 1);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_unknown_id_is_ignored() {
        let list = SubscriberList::new();
        let id = SubscriptionId::next();
        list.remove(id);
        assert!(list.is_empty());
    }
}

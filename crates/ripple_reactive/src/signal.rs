//! Observable value cells.

use core::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::observer::record_read;
use crate::source::{Source, SourceId, Subscriber, SubscriberList, SubscriptionId};

struct SignalInner<T> {
    id: SourceId,
    value: RwLock<T>,
    subscribers: SubscriberList,
}

impl<T: Send + Sync + 'static> Source for SignalInner<T> {
    fn id(&self) -> SourceId {
        self.id
    }

    fn subscribe(&self, subscriber: Weak<dyn Subscriber>) -> SubscriptionId {
        self.subscribers.add(subscriber)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.remove(id);
    }
}

/// A shared, observable value.
///
/// Cloning a `Signal` produces another handle to the same cell. Reads through
/// [`get`](Self::get) or [`with`](Self::with) are logged into the active
/// [`ReadLog`](crate::ReadLog); writes notify subscribers after the value lock
/// has been released.
///
/// # Example
///
/// ```
/// use ripple_reactive::{Signal, observe};
///
/// let name = Signal::new(String::from("ada"));
/// let (len, log) = observe(|| name.with(String::len));
///
/// assert_eq!(len, 3);
/// assert!(log.contains(name.id()));
/// ```
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Signal<T> {
    /// Creates a new signal holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: SourceId::next(),
                value: RwLock::new(value),
                subscribers: SubscriberList::new(),
            }),
        }
    }

    /// Returns the signal's source identifier.
    #[must_use]
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Returns this signal as a type-erased [`Source`].
    #[must_use]
    pub fn as_source(&self) -> Arc<dyn Source> {
        self.inner.clone()
    }

    fn track(&self) {
        record_read(self.inner.id, || self.as_source());
    }

    /// Borrows the value, logging the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        self.with_untracked(f)
    }

    /// Borrows the value without logging the read.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.read())
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        *self.inner.value.write() = value;
        self.notify();
    }

    /// Mutates the value in place and notifies subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut *self.inner.value.write());
        self.notify();
        result
    }

    /// Mutates the value in place without notifying.
    ///
    /// Lets an owner commit a write under its own lock and call
    /// [`notify`](Self::notify) once that lock is released.
    pub fn update_silently<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.inner.value.write())
    }

    /// Notifies subscribers without touching the value.
    pub fn notify(&self) {
        self.inner.subscribers.notify_all(self.inner.id);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Returns a clone of the value, logging the read.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Returns a clone of the value without logging the read.
    #[must_use]
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: PartialEq + Send + Sync + 'static> Signal<T> {
    /// Replaces the value only if it differs, notifying in that case.
    ///
    /// Returns whether the value changed.
    pub fn set_if_changed(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.write();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.notify();
        true
    }
}

impl<T: Default + Send + Sync + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl Subscriber for Counter {
        fn notify(&self, _source: SourceId) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counter_on<T: Send + Sync + 'static>(signal: &Signal<T>) -> Arc<Counter> {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let weak: Weak<dyn Subscriber> = Arc::downgrade(&counter) as Weak<dyn Subscriber>;
        signal.as_source().subscribe(weak);
        counter
    }

    #[test]
    fn set_notifies_subscribers() {
        let signal = Signal::new(0);
        let counter = counter_on(&signal);

        signal.set(1);
        signal.update(|v| *v += 1);

        assert_eq!(signal.get_untracked(), 2);
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn set_if_changed_skips_equal_values() {
        let signal = Signal::new("a");
        let counter = counter_on(&signal);

        assert!(!signal.set_if_changed("a"));
        assert!(signal.set_if_changed("b"));

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_the_cell() {
        let a = Signal::new(1);
        let b = a.clone();
        b.set(5);
        assert_eq!(a.get(), 5);
        assert_eq!(a.id(), b.id());
    }
}

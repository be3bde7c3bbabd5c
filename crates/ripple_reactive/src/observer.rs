//! Read logging.
//!
//! Dependency tracking is explicit: [`observe`] opens a [`ReadLog`] on the
//! current thread, and every [`Source`] read while the log is open records
//! itself into it via [`record_read`]. The caller decides what to do with
//! the resulting set of sources (usually subscribe to them).
//!
//! Logs nest. An inner [`observe`] gets its own log and its reads do not
//! appear in the outer one; [`untracked`] suspends logging entirely for
//! the duration of its closure.

use core::cell::RefCell;
use std::sync::Arc;

use hashbrown::HashSet;

use crate::source::{Source, SourceId};

thread_local! {
    static FRAMES: RefCell<Vec<Option<ReadLog>>> = const { RefCell::new(Vec::new()) };
}

/// The ordered, deduplicated set of sources read during one observation.
#[derive(Default)]
pub struct ReadLog {
    sources: Vec<Arc<dyn Source>>,
    seen: HashSet<SourceId>,
}

impl ReadLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a source; duplicates are ignored.
    pub fn insert(&mut self, source: Arc<dyn Source>) {
        if self.seen.insert(source.id()) {
            self.sources.push(source);
        }
    }

    /// Returns `true` if the source with `id` was read.
    #[must_use]
    pub fn contains(&self, id: SourceId) -> bool {
        self.seen.contains(&id)
    }

    /// Number of distinct sources read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if nothing was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterates the sources in first-read order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }
}

impl IntoIterator for ReadLog {
    type Item = Arc<dyn Source>;
    type IntoIter = std::vec::IntoIter<Arc<dyn Source>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

/// Pops the frame it pushed, even if the observed closure panics.
struct FrameGuard;

impl FrameGuard {
    fn push(frame: Option<ReadLog>) -> Self {
        FRAMES.with(|frames| frames.borrow_mut().push(frame));
        FrameGuard
    }

    fn finish(self) -> Option<ReadLog> {
        let frame = FRAMES.with(|frames| frames.borrow_mut().pop()).flatten();
        core::mem::forget(self);
        frame
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

/// Evaluates `f` while logging every source it reads.
pub fn observe<R>(f: impl FnOnce() -> R) -> (R, ReadLog) {
    let guard = FrameGuard::push(Some(ReadLog::new()));
    let value = f();
    let log = guard.finish().unwrap_or_default();
    (value, log)
}

/// Evaluates `f` with read logging suspended.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let guard = FrameGuard::push(None);
    let value = f();
    guard.finish();
    value
}

/// Returns `true` if a read on this thread would currently be logged.
#[must_use]
pub fn is_observing() -> bool {
    FRAMES.with(|frames| matches!(frames.borrow().last(), Some(Some(_))))
}

/// Records a read of the source `id` into the innermost open log.
///
/// `source` is only invoked when a log is actually open, so sources can
/// defer the cost of producing a shared handle to themselves.
pub fn record_read(id: SourceId, source: impl FnOnce() -> Arc<dyn Source>) {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        if let Some(Some(log)) = frames.last_mut()
            && !log.contains(id)
        {
            log.insert(source());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    #[test]
    fn observe_records_reads_in_order() {
        let a = Signal::new(1);
        let b = Signal::new(2);

        let (sum, log) = observe(|| b.get() + a.get() + b.get());

        assert_eq!(sum, 5);
        let ids: Vec<_> = log.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![b.id(), a.id()]);
    }

    #[test]
    fn nested_observe_does_not_leak_into_outer() {
        let a = Signal::new(1);
        let b = Signal::new(2);

        let (_, outer) = observe(|| {
            let _ = a.get();
            let (_, inner) = observe(|| b.get());
            assert!(inner.contains(b.id()));
        });

        assert!(outer.contains(a.id()));
        assert!(!outer.contains(b.id()));
    }

    #[test]
    fn untracked_suspends_logging() {
        let a = Signal::new(1);
        let (_, log) = observe(|| untracked(|| a.get()));
        assert!(log.is_empty());
    }

    #[test]
    fn reads_outside_observe_are_not_logged() {
        let a = Signal::new(1);
        assert!(!is_observing());
        assert_eq!(a.get(), 1);
    }

    #[test]
    fn frame_is_popped_after_panic() {
        let result = std::panic::catch_unwind(|| {
            observe(|| panic!("boom"));
        });
        assert!(result.is_err());
        assert!(!is_observing());
    }
}

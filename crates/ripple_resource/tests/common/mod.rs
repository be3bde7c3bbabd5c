//! Shared helpers for `ripple_resource` integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not every item is used by every test binary"
)]

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

// ═══════════════════════════════════════════════════════════════════════════════
// GATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Hands out one oneshot receiver per invocation so tests decide when, and in
/// which order, invocations settle.
pub struct Gates<T> {
    senders: Mutex<Vec<Option<oneshot::Sender<T>>>>,
}

impl<T> Gates<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            senders: Mutex::new(Vec::new()),
        })
    }

    /// Opens the next gate and returns the receiving end.
    pub fn open(&self) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        self.senders.lock().push(Some(tx));
        rx
    }

    /// Number of gates opened so far.
    pub fn opened(&self) -> usize {
        self.senders.lock().len()
    }

    /// Completes gate `index` with `value`. Returns `false` if the receiver is gone.
    pub fn release(&self, index: usize, value: T) -> bool {
        let sender = self.senders.lock().get_mut(index).and_then(Option::take);
        sender.is_some_and(|tx| tx.send(value).is_ok())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered record of what happened, shared between test and computation.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEDULING
// ═══════════════════════════════════════════════════════════════════════════════

/// Lets spawned invocations on the current-thread runtime make progress.
pub async fn flush() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

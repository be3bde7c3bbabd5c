//! Per-invocation cleanup callbacks.

use std::panic::{AssertUnwindSafe, catch_unwind};

pub(crate) type CleanupFn = Box<dyn FnOnce() + Send>;

/// Ordered callbacks registered by one invocation.
///
/// Callbacks are consumed when run, so each runs at most once.
#[derive(Default)]
pub(crate) struct CleanupRegistry {
    callbacks: Vec<CleanupFn>,
}

impl CleanupRegistry {
    pub(crate) fn register(&mut self, callback: CleanupFn) {
        self.callbacks.push(callback);
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Moves the callbacks out, leaving this registry empty.
    pub(crate) fn take(&mut self) -> CleanupRegistry {
        core::mem::take(self)
    }

    /// Runs every callback in registration order.
    ///
    /// A panicking callback is logged and the remaining ones still run.
    pub(crate) fn run(self, resource: &str, generation: u64) {
        if self.callbacks.is_empty() {
            return;
        }
        tracing::trace!(
            resource,
            generation,
            count = self.len(),
            "running cleanup callbacks"
        );
        for callback in self.callbacks {
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                tracing::warn!(resource, generation, "cleanup callback panicked");
            }
        }
    }
}

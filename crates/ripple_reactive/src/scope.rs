//! Ownership scopes.
//!
//! A [`Scope`] stands in for the lifetime of a component instance. Things
//! created on behalf of that instance (effects, resources) register a
//! teardown callback with [`Scope::on_dispose`]; disposing the scope runs
//! those callbacks exactly once, in registration order.

use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;

type DisposeFn = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct ScopeState {
    callbacks: Vec<DisposeFn>,
    children: Vec<Scope>,
    disposed: bool,
}

#[derive(Default)]
struct ScopeInner {
    state: Mutex<ScopeState>,
}

impl ScopeInner {
    fn dispose(&self) {
        let (children, callbacks) = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                core::mem::take(&mut state.children),
                core::mem::take(&mut state.callbacks),
            )
        };

        for child in children {
            child.dispose();
        }
        for callback in callbacks {
            run_callback(callback);
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn run_callback(callback: DisposeFn) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        tracing::warn!("scope dispose callback panicked");
    }
}

/// Teardown notification for an owning component instance.
///
/// Handles are cheap to clone and share one scope. The scope is disposed by
/// an explicit [`dispose`](Self::dispose) call or when its last handle is
/// dropped.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use ripple_reactive::Scope;
///
/// let scope = Scope::new();
/// let closed = Arc::new(AtomicBool::new(false));
///
/// let flag = Arc::clone(&closed);
/// scope.on_dispose(move || flag.store(true, Ordering::SeqCst));
///
/// scope.dispose();
/// assert!(closed.load(Ordering::SeqCst));
/// ```
#[derive(Clone, Default)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Creates a new root scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child scope that is disposed before this scope's callbacks.
    ///
    /// A child of an already-disposed scope starts out disposed.
    #[must_use]
    pub fn child(&self) -> Scope {
        let child = Scope::new();
        let mut state = self.inner.state.lock();
        if state.disposed {
            drop(state);
            child.dispose();
        } else {
            state.children.push(child.clone());
        }
        child
    }

    /// Registers a callback to run when the scope is disposed.
    ///
    /// If the scope is already disposed the callback runs immediately.
    pub fn on_dispose(&self, f: impl FnOnce() + Send + 'static) {
        let mut state = self.inner.state.lock();
        if state.disposed {
            drop(state);
            run_callback(Box::new(f));
        } else {
            state.callbacks.push(Box::new(f));
        }
    }

    /// Disposes children, then runs the registered callbacks. Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Returns `true` once the scope has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Scope")
            .field("callbacks", &state.callbacks.len())
            .field("children", &state.children.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}

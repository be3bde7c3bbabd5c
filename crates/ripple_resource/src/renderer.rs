//! Tri-state rendering for resources.
//!
//! A [`ResourceRenderer`] maps a [`ResourceState`] to one of three
//! caller-supplied branches. It never blocks: whatever the state, there is a
//! branch (or deliberately nothing) to show right away.
//!
//! # Example
//!
//! ```
//! use ripple_resource::ResourceRenderer;
//!
//! let renderer: ResourceRenderer<i32, String, String> = ResourceRenderer::new()
//!     .on_pending(|| "loading...".to_string())
//!     .on_resolved(|value| format!("value: {value}"))
//!     .on_rejected(|error| format!("error: {error}"));
//! # let _ = renderer;
//! ```

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::controller::Resource;
use crate::error::ResourceError;
use crate::state::{ResourceState, ResourceStatus};

type PendingBranch<V> = Box<dyn Fn() -> V + Send + Sync>;
type ResolvedBranch<T, V> = Box<dyn Fn(&T) -> V + Send + Sync>;
type RejectedBranch<E, V> = Box<dyn Fn(&ResourceError<E>) -> V + Send + Sync>;

/// What a cached output was rendered from.
///
/// Values and errors are compared by identity: every commit allocates a new
/// `Arc`, so identity changes exactly when the resource produced something
/// new.
struct RenderKey<T, E> {
    status: ResourceStatus,
    value: Option<Arc<T>>,
    error: Option<Arc<ResourceError<E>>>,
}

impl<T, E> RenderKey<T, E> {
    fn of(state: &ResourceState<T, E>) -> Self {
        let status = state.status();
        Self {
            status,
            value: status
                .is_resolved()
                .then(|| state.value_handle().cloned())
                .flatten(),
            error: status
                .is_rejected()
                .then(|| state.error_handle().cloned())
                .flatten(),
        }
    }

    fn matches(&self, other: &Self) -> bool {
        fn same<X>(a: &Option<Arc<X>>, b: &Option<Arc<X>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }

        self.status == other.status
            && same(&self.value, &other.value)
            && same(&self.error, &other.error)
    }
}

struct Rendered<T, E, V> {
    key: RenderKey<T, E>,
    output: Option<V>,
}

/// Selects and memoizes one of three render branches for a resource.
///
/// - `Pending` calls the `on_pending` branch with no arguments.
/// - `Resolved` calls `on_resolved` with the value.
/// - `Rejected` calls `on_rejected` with the error.
///
/// A branch that was not supplied renders `None`. The last output is cached
/// and reused until the status, value, or error actually changes, so
/// rendering the same state repeatedly calls no branch at all.
pub struct ResourceRenderer<T, E, V> {
    on_pending: Option<PendingBranch<V>>,
    on_resolved: Option<ResolvedBranch<T, V>>,
    on_rejected: Option<RejectedBranch<E, V>>,
    cache: Mutex<Option<Rendered<T, E, V>>>,
}

impl<T, E, V> Default for ResourceRenderer<T, E, V> {
    fn default() -> Self {
        Self {
            on_pending: None,
            on_resolved: None,
            on_rejected: None,
            cache: Mutex::new(None),
        }
    }
}

impl<T, E, V> ResourceRenderer<T, E, V> {
    /// Creates a renderer with no branches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the branch shown while pending.
    #[must_use]
    pub fn on_pending(mut self, branch: impl Fn() -> V + Send + Sync + 'static) -> Self {
        self.on_pending = Some(Box::new(branch));
        self
    }

    /// Sets the branch shown once resolved.
    #[must_use]
    pub fn on_resolved(mut self, branch: impl Fn(&T) -> V + Send + Sync + 'static) -> Self {
        self.on_resolved = Some(Box::new(branch));
        self
    }

    /// Sets the branch shown once rejected.
    #[must_use]
    pub fn on_rejected(
        mut self,
        branch: impl Fn(&ResourceError<E>) -> V + Send + Sync + 'static,
    ) -> Self {
        self.on_rejected = Some(Box::new(branch));
        self
    }

    /// Drops the cached output so the next render selects a branch again.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    fn select(&self, state: &ResourceState<T, E>) -> Option<V> {
        match state.status() {
            ResourceStatus::Pending => self.on_pending.as_ref().map(|branch| branch()),
            ResourceStatus::Resolved => self
                .on_resolved
                .as_ref()
                .zip(state.value())
                .map(|(branch, value)| branch(value)),
            ResourceStatus::Rejected => self
                .on_rejected
                .as_ref()
                .zip(state.error())
                .map(|(branch, error)| branch(error)),
        }
    }
}

impl<T, E, V: Clone> ResourceRenderer<T, E, V> {
    /// Renders `state`, reusing the cached output when nothing changed.
    pub fn render(&self, state: &ResourceState<T, E>) -> Option<V> {
        let key = RenderKey::of(state);
        if let Some(cached) = self.cache.lock().as_ref()
            && cached.key.matches(&key)
        {
            return cached.output.clone();
        }

        // Branches run without the cache lock held.
        let output = self.select(state);
        *self.cache.lock() = Some(Rendered {
            key,
            output: output.clone(),
        });
        output
    }
}

impl<T, E, V> ResourceRenderer<T, E, V>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    V: Clone,
{
    /// Renders the resource's current state.
    ///
    /// The state read is tracked, so calling this inside an
    /// [`Effect`](ripple_reactive::Effect) re-renders whenever the resource
    /// changes.
    pub fn render_resource(&self, resource: &Resource<T, E>) -> Option<V> {
        self.render(&resource.state())
    }
}

impl<T, E, V> fmt::Debug for ResourceRenderer<T, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRenderer")
            .field("on_pending", &self.on_pending.is_some())
            .field("on_resolved", &self.on_resolved.is_some())
            .field("on_rejected", &self.on_rejected.is_some())
            .field("cached", &self.cache.lock().is_some())
            .finish()
    }
}

//! The per-invocation tracking context.

use core::fmt;
use std::sync::{Arc, Weak};

use ripple_reactive::{Signal, observe};

use crate::abort::AbortSignal;
use crate::cleanup::CleanupRegistry;
use crate::controller::Core;

/// Handed to the computation on every invocation.
///
/// The context is tied to the generation it was created for. While that
/// generation is current, [`track`](Self::track) subscribes the resource to
/// whatever the accessor reads and [`cleanup`](Self::cleanup) queues a
/// callback for the next supersession or teardown. Once a newer invocation
/// has started, the context goes inert: `track` still returns the
/// accessor's value but subscribes nothing, and `cleanup` runs its callback
/// straight away.
///
/// The context is cheap to clone and may be moved into the computation's
/// future; it does not keep the resource alive.
pub struct ResourceContext<T, E> {
    core: Weak<Core<T, E>>,
    generation: u64,
    signal: AbortSignal,
    previous: Option<Arc<T>>,
}

impl<T, E> ResourceContext<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) fn new(
        core: Weak<Core<T, E>>,
        generation: u64,
        signal: AbortSignal,
        previous: Option<Arc<T>>,
    ) -> Self {
        Self {
            core,
            generation,
            signal,
            previous,
        }
    }

    /// Evaluates `accessor` and registers every source it read as a
    /// dependency of this invocation.
    ///
    /// May be called any number of times, including after `.await` points.
    pub fn track<R>(&self, accessor: impl FnOnce() -> R) -> R {
        let (value, log) = observe(accessor);
        if let Some(core) = self.core.upgrade() {
            core.track(self.generation, log);
        }
        value
    }

    /// Tracks a single signal and returns its value.
    pub fn track_signal<V>(&self, signal: &Signal<V>) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.track(|| signal.get())
    }

    /// Registers `callback` to run when this invocation is superseded or the
    /// resource is torn down.
    ///
    /// Callbacks run in registration order, each at most once.
    pub fn cleanup(&self, callback: impl FnOnce() + Send + 'static) {
        match self.core.upgrade() {
            Some(core) => core.register_cleanup(self.generation, Box::new(callback)),
            None => {
                let mut late = CleanupRegistry::default();
                late.register(Box::new(callback));
                late.run("released", self.generation);
            }
        }
    }

    /// The abort signal for this invocation.
    ///
    /// Cancelled after the invocation's cleanups run on supersession or
    /// teardown, on [`Resource::abort`](crate::Resource::abort), and when a
    /// configured timeout elapses.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Returns `true` if this invocation's signal has been cancelled.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.signal.is_cancelled()
    }

    /// The last value the resource resolved to before this invocation.
    #[must_use]
    pub fn previous(&self) -> Option<Arc<T>> {
        self.previous.clone()
    }

    /// The generation this context belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while this context's invocation is the current one.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.core
            .upgrade()
            .is_some_and(|core| core.is_current(self.generation))
    }
}

impl<T, E> Clone for ResourceContext<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            generation: self.generation,
            signal: self.signal.clone(),
            previous: self.previous.clone(),
        }
    }
}

impl<T, E> fmt::Debug for ResourceContext<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceContext")
            .field("generation", &self.generation)
            .field("aborted", &self.signal.is_cancelled())
            .finish_non_exhaustive()
    }
}

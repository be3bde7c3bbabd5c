//! The resource controller.
//!
//! [`Resource`] owns one asynchronous computation and keeps its
//! [`ResourceState`] current:
//!
//! - Every invocation gets a new generation, a fresh [`ResourceContext`], and
//!   a fresh [`AbortSignal`].
//! - Before an invocation starts, the cleanups registered by the previous one
//!   run (in registration order) and the previous signal is cancelled.
//! - A result is committed only if its generation is still current and the
//!   resource has not been torn down; anything else is dropped silently.
//!
//! All state writes happen under the controller lock together with the
//! generation check, and subscribers are notified after the lock is
//! released.

use core::fmt;
use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::pin;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use ripple_reactive::{ReadLog, Scope, Signal, SourceId, Subscriber, Subscription, untracked};
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::abort::AbortSignal;
use crate::cleanup::{CleanupFn, CleanupRegistry};
use crate::context::ResourceContext;
use crate::error::{ResourceError, panic_message};
use crate::options::ResourceOptions;
use crate::state::ResourceState;

type Computation<T, E> =
    Box<dyn Fn(ResourceContext<T, E>) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// ComputationHandle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to the in-flight (or last completed) invocation.
#[derive(Clone)]
pub struct ComputationHandle {
    generation: u64,
    signal: AbortSignal,
    settled: Arc<AtomicBool>,
}

impl ComputationHandle {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            signal: AbortSignal::new(),
            settled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The generation of the invocation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The invocation's abort signal.
    #[must_use]
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Returns `true` once a result for this invocation was committed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    fn mark_settled(&self) {
        self.settled.store(true, Ordering::Release);
    }
}

impl fmt::Debug for ComputationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputationHandle")
            .field("generation", &self.generation)
            .field("cancelled", &self.signal.is_cancelled())
            .field("settled", &self.is_settled())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller internals
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ControllerState {
    generation: u64,
    started: bool,
    cleanups: CleanupRegistry,
    subscriptions: Vec<Subscription>,
    current: Option<ComputationHandle>,
    invoking: bool,
    rerun: bool,
    disposed: bool,
}

pub(crate) struct Core<T, E> {
    computation: Computation<T, E>,
    options: ResourceOptions,
    state: Signal<ResourceState<T, E>>,
    control: Mutex<ControllerState>,
    settled: Notify,
    runtime: Handle,
    this: Weak<Core<T, E>>,
}

/// Clears the invoking flag if an invocation unwinds.
struct InvokeGuard<'a> {
    control: &'a Mutex<ControllerState>,
    armed: bool,
}

impl Drop for InvokeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut control = self.control.lock();
            control.invoking = false;
            control.rerun = false;
        }
    }
}

impl<T, E> Core<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.options.name()
    }

    /// Starts a new invocation, coalescing re-entrant requests.
    fn invoke(&self) {
        {
            let mut control = self.control.lock();
            if control.disposed {
                return;
            }
            if control.invoking {
                control.rerun = true;
                return;
            }
            control.invoking = true;
        }

        let mut guard = InvokeGuard {
            control: &self.control,
            armed: true,
        };
        loop {
            self.start_generation();

            let mut control = self.control.lock();
            if control.rerun && !control.disposed {
                control.rerun = false;
                continue;
            }
            control.invoking = false;
            control.rerun = false;
            guard.armed = false;
            break;
        }
    }

    fn start_generation(&self) {
        let (generation, cleanups, subscriptions, previous, handle) = {
            let mut control = self.control.lock();
            if control.disposed {
                return;
            }
            let generation = if control.started {
                control.generation + 1
            } else {
                control.started = true;
                0
            };
            control.generation = generation;
            let handle = ComputationHandle::new(generation);
            let previous = control.current.replace(handle.clone());
            (
                generation,
                control.cleanups.take(),
                core::mem::take(&mut control.subscriptions),
                previous,
                handle,
            )
        };

        drop(subscriptions);
        if let Some(previous) = &previous {
            cleanups.run(self.name(), previous.generation);
            previous.signal.cancel();
        }

        tracing::debug!(resource = self.name(), generation, "invoking resource computation");

        let previous_value = {
            let control = self.control.lock();
            if control.disposed || control.generation != generation {
                return;
            }
            let retain = self.options.retain_stale();
            let mut previous_value = None;
            self.state.update_silently(|state| {
                previous_value = state.value_handle().cloned();
                state.begin(generation, retain);
            });
            previous_value
        };
        self.state.notify();

        let ctx = ResourceContext::new(
            self.this.clone(),
            generation,
            handle.signal.clone(),
            previous_value,
        );

        // The synchronous prefix must not leak reads into an enclosing observer.
        let started = untracked(|| catch_unwind(AssertUnwindSafe(|| (self.computation)(ctx))));
        let future = match started {
            Ok(future) => future,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.settle(generation, Err(ResourceError::Panicked(message)));
                return;
            }
        };

        let core = self.this.clone();
        let timeout = self.options.timeout();
        let signal = handle.signal.clone();
        self.runtime.spawn(async move {
            let outcome = drive(future, timeout, signal).await;
            if let Some(core) = core.upgrade() {
                core.settle(generation, outcome);
            }
        });
    }

    /// Commits `outcome` if `generation` is still current and unsettled.
    fn settle(&self, generation: u64, outcome: Result<T, ResourceError<E>>) {
        {
            let control = self.control.lock();
            if control.disposed {
                tracing::debug!(resource = self.name(), generation, "discarding result after teardown");
                return;
            }
            let current = match &control.current {
                Some(handle) if handle.generation == generation && control.generation == generation => handle,
                _ => {
                    tracing::debug!(
                        resource = self.name(),
                        generation,
                        current = control.generation,
                        "discarding stale result"
                    );
                    return;
                }
            };
            if current.is_settled() {
                tracing::debug!(resource = self.name(), generation, "discarding late result");
                return;
            }
            current.mark_settled();
            self.state.update_silently(|state| state.commit(outcome));
        }

        tracing::debug!(
            resource = self.name(),
            generation,
            status = %self.state.with_untracked(ResourceState::status),
            "resource settled"
        );
        self.state.notify();
        self.settled.notify_waiters();
    }

    /// Subscribes to the sources in `log` on behalf of `generation`.
    pub(crate) fn track(&self, generation: u64, log: ReadLog) {
        if log.is_empty() {
            return;
        }
        let this: Weak<dyn Subscriber> = self.this.clone();
        let fresh: Vec<Subscription> = log
            .into_iter()
            .map(|source| Subscription::new(&source, this.clone()))
            .collect();

        let rejected = {
            let mut control = self.control.lock();
            if control.disposed || control.generation != generation {
                Some(fresh)
            } else {
                control.subscriptions.extend(fresh);
                None
            }
        };
        drop(rejected);
    }

    /// Registers a cleanup for `generation`, or runs it now if that
    /// invocation is no longer current.
    pub(crate) fn register_cleanup(&self, generation: u64, callback: CleanupFn) {
        let callback = {
            let mut control = self.control.lock();
            if control.disposed || control.generation != generation {
                Some(callback)
            } else {
                control.cleanups.register(callback);
                None
            }
        };
        if let Some(callback) = callback {
            let mut late = CleanupRegistry::default();
            late.register(callback);
            late.run(self.name(), generation);
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        let control = self.control.lock();
        !control.disposed && control.generation == generation
    }

    fn abort(&self) {
        let handle = {
            let control = self.control.lock();
            if control.disposed {
                return;
            }
            let Some(handle) = control.current.clone() else {
                return;
            };
            handle.signal.cancel();
            if handle.is_settled() {
                return;
            }
            handle.mark_settled();
            self.state
                .update_silently(|state| state.commit(Err(ResourceError::Aborted)));
            handle
        };

        tracing::debug!(resource = self.name(), generation = handle.generation, "resource aborted");
        self.state.notify();
        self.settled.notify_waiters();
    }

    fn teardown(&self) {
        let (cleanups, subscriptions, current) = {
            let mut control = self.control.lock();
            if control.disposed {
                return;
            }
            control.disposed = true;
            (
                control.cleanups.take(),
                core::mem::take(&mut control.subscriptions),
                control.current.clone(),
            )
        };

        drop(subscriptions);
        let generation = current.as_ref().map_or(0, ComputationHandle::generation);
        cleanups.run(self.name(), generation);
        if let Some(current) = current {
            current.signal.cancel();
        }

        tracing::debug!(resource = self.name(), generation, "resource torn down");
        self.settled.notify_waiters();
    }
}

impl<T, E> Subscriber for Core<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn notify(&self, source: SourceId) {
        tracing::trace!(resource = self.name(), %source, "tracked dependency changed");
        self.invoke();
    }
}

impl<T, E> Drop for Core<T, E> {
    fn drop(&mut self) {
        let control = self.control.get_mut();
        if control.disposed {
            return;
        }
        control.disposed = true;
        let cleanups = control.cleanups.take();
        let generation = control.current.as_ref().map_or(0, ComputationHandle::generation);
        if let Some(current) = &control.current {
            current.signal.cancel();
        }
        cleanups.run(self.options.name(), generation);
    }
}

/// Runs one invocation to completion, mapping every outcome to a result.
async fn drive<T, E>(
    future: BoxFuture<'static, Result<T, E>>,
    timeout: Option<Duration>,
    signal: AbortSignal,
) -> Result<T, ResourceError<E>> {
    let guarded = AssertUnwindSafe(future).catch_unwind();
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(outcome) => outcome,
            Err(_) => {
                signal.cancel();
                return Err(ResourceError::TimedOut(limit));
            }
        },
        None => guarded.await,
    };

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ResourceError::Failed(err)),
        Err(payload) => Err(ResourceError::Panicked(panic_message(payload.as_ref()))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource
// ─────────────────────────────────────────────────────────────────────────────

/// A reactive wrapper around one asynchronous computation.
///
/// The computation is invoked once on construction and again whenever a
/// dependency it tracked through its [`ResourceContext`] changes (or
/// [`refetch`](Self::refetch) is called). Its outcome is exposed as a
/// [`ResourceState`] that is itself reactive: reading it through
/// [`state`](Self::state) inside an effect subscribes that effect.
///
/// Construction must happen inside a tokio runtime; the asynchronous part of
/// each invocation is spawned onto it, even when a dependency changes on a
/// thread outside the runtime.
///
/// # Example
///
/// ```
/// use ripple_reactive::Signal;
/// use ripple_resource::Resource;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let user_id = Signal::new(7_u32);
///
/// let profile = Resource::new({
///     let user_id = user_id.clone();
///     move |ctx| {
///         let id = ctx.track(|| user_id.get());
///         async move { Ok::<_, String>(format!("user-{id}")) }
///     }
/// });
///
/// let state = profile.settled().await;
/// assert_eq!(state.value().map(String::as_str), Some("user-7"));
///
/// user_id.set(8);
/// let state = profile.settled().await;
/// assert_eq!(state.value().map(String::as_str), Some("user-8"));
/// assert_eq!(state.generation(), 1);
/// # }
/// ```
pub struct Resource<T, E> {
    core: Arc<Core<T, E>>,
}

impl<T, E> Clone for Resource<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T, E> Resource<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a resource with default options and invokes it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new<F, Fut>(computation: F) -> Self
    where
        F: Fn(ResourceContext<T, E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::with_options(computation, ResourceOptions::default())
    }

    /// Creates a resource with the given options and invokes it.
    ///
    /// Later invocations are spawned onto the runtime current at
    /// construction, whichever thread triggers them.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_options<F, Fut>(computation: F, options: ResourceOptions) -> Self
    where
        F: Fn(ResourceContext<T, E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let core = Arc::new_cyclic(|this| Core {
            computation: Box::new(move |ctx| computation(ctx).boxed()),
            options,
            state: Signal::new(ResourceState::new()),
            control: Mutex::new(ControllerState::default()),
            settled: Notify::new(),
            runtime: Handle::current(),
            this: this.clone(),
        });
        core.invoke();
        Self { core }
    }

    /// Returns a snapshot of the state, logging the read.
    #[must_use]
    pub fn state(&self) -> ResourceState<T, E> {
        self.core.state.get()
    }

    /// Returns a snapshot of the state without logging the read.
    #[must_use]
    pub fn state_untracked(&self) -> ResourceState<T, E> {
        self.core.state.get_untracked()
    }

    /// Returns the current generation (0 for the first invocation).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.core.control.lock().generation
    }

    /// Returns a handle to the current invocation.
    #[must_use]
    pub fn computation(&self) -> Option<ComputationHandle> {
        self.core.control.lock().current.clone()
    }

    /// Returns the options this resource was created with.
    #[must_use]
    pub fn options(&self) -> &ResourceOptions {
        &self.core.options
    }

    /// Re-invokes the computation as if a dependency had changed.
    pub fn refetch(&self) {
        self.core.invoke();
    }

    /// Cancels the current invocation's signal and, if it has not settled
    /// yet, rejects it with [`ResourceError::Aborted`].
    pub fn abort(&self) {
        self.core.abort();
    }

    /// Waits until the current generation leaves `Pending`.
    ///
    /// Returns the last snapshot immediately once the resource is disposed.
    pub async fn settled(&self) -> ResourceState<T, E> {
        loop {
            let mut notified = pin!(self.core.settled.notified());
            notified.as_mut().enable();

            let state = self.state_untracked();
            if !state.is_loading() || self.is_disposed() {
                return state;
            }
            notified.await;
        }
    }

    /// Tears the resource down: runs outstanding cleanups once, cancels the
    /// current signal, and stops reacting to dependencies. Idempotent.
    pub fn dispose(&self) {
        self.core.teardown();
    }

    /// Returns `true` once the resource has been torn down.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.control.lock().disposed
    }

    /// Tears the resource down when `scope` is disposed.
    pub fn bind_to(&self, scope: &Scope) {
        let resource = self.clone();
        scope.on_dispose(move || resource.dispose());
    }

    /// Number of dependencies tracked by the current invocation.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.core.control.lock().subscriptions.len()
    }
}

impl<T, E> fmt::Debug for Resource<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let control = self.core.control.lock();
        f.debug_struct("Resource")
            .field("name", &self.core.options.name())
            .field("generation", &control.generation)
            .field("disposed", &control.disposed)
            .finish_non_exhaustive()
    }
}

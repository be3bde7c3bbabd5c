//! Self-tracking side effects.

use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::observer::observe;
use crate::scope::Scope;
use crate::source::{SourceId, Subscriber, Subscription};

#[derive(Default)]
struct EffectState {
    subscriptions: Vec<Subscription>,
    running: bool,
    dirty: bool,
    disposed: bool,
    runs: u64,
}

struct EffectInner {
    run: Box<dyn Fn() + Send + Sync>,
    state: Mutex<EffectState>,
    this: Weak<EffectInner>,
}

impl EffectInner {
    fn schedule(&self) {
        {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            if state.running {
                state.dirty = true;
                return;
            }
            state.running = true;
        }

        loop {
            let outcome = catch_unwind(AssertUnwindSafe(|| observe(|| (self.run)())));
            let log = match outcome {
                Ok(((), log)) => log,
                Err(payload) => {
                    let mut state = self.state.lock();
                    state.running = false;
                    state.dirty = false;
                    drop(state);
                    resume_unwind(payload);
                }
            };

            let this: Weak<dyn Subscriber> = self.this.clone();
            let fresh: Vec<Subscription> = log
                .into_iter()
                .map(|source| Subscription::new(&source, this.clone()))
                .collect();

            let (stale, again) = {
                let mut state = self.state.lock();
                state.runs += 1;
                if state.disposed {
                    state.running = false;
                    (fresh, false)
                } else {
                    let stale = core::mem::replace(&mut state.subscriptions, fresh);
                    let again = core::mem::take(&mut state.dirty);
                    if !again {
                        state.running = false;
                    }
                    (stale, again)
                }
            };
            drop(stale);
            if !again {
                break;
            }
        }
    }
}

impl Subscriber for EffectInner {
    fn notify(&self, source: SourceId) {
        tracing::trace!(%source, "effect notified");
        self.schedule();
    }
}

/// A side effect that re-runs whenever a source it read changes.
///
/// The closure runs once, synchronously, inside [`Effect::new`]. Every
/// source it reads becomes a dependency; when any dependency notifies, the
/// closure runs again and its dependency set is replaced by what that run
/// read. Notifications that arrive while the closure is running are
/// coalesced into a single follow-up run.
///
/// The effect lives as long as its handle (or a [`Scope`] it is bound to).
#[derive(Clone)]
pub struct Effect {
    inner: Arc<EffectInner>,
}

impl Effect {
    /// Creates the effect and runs it once.
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        let inner = Arc::new_cyclic(|this| EffectInner {
            run: Box::new(f),
            state: Mutex::new(EffectState::default()),
            this: this.clone(),
        });
        inner.schedule();
        Self { inner }
    }

    /// Stops the effect and drops its subscriptions.
    pub fn dispose(&self) {
        let subscriptions = {
            let mut state = self.inner.state.lock();
            state.disposed = true;
            core::mem::take(&mut state.subscriptions)
        };
        drop(subscriptions);
    }

    /// Returns `true` once [`dispose`](Self::dispose) was called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Number of completed runs.
    #[must_use]
    pub fn run_count(&self) -> u64 {
        self.inner.state.lock().runs
    }

    /// Number of sources the last run depended on.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.inner.state.lock().subscriptions.len()
    }

    /// Keeps the effect alive until `scope` is disposed, then disposes it.
    pub fn bind_to(&self, scope: &Scope) {
        let effect = self.clone();
        scope.on_dispose(move || effect.dispose());
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Effect")
            .field("runs", &state.runs)
            .field("dependencies", &state.subscriptions.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}

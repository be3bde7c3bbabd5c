//! Fine-grained reactivity primitives for Ripple.
//!
//! This crate is the host layer that resources are built on. It is kept
//! deliberately small:
//!
//! - [`signal`] - Observable cells ([`Signal`])
//! - [`source`] - The [`Source`] / [`Subscriber`] seam and [`Subscription`] guards
//! - [`observer`] - Read logging ([`observe`], [`untracked`])
//! - [`effect`] - Self-tracking side effects ([`Effect`])
//! - [`scope`] - Ownership and teardown notification ([`Scope`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use ripple_reactive::{Effect, Signal};
//!
//! let count = Signal::new(1);
//! let runs = Arc::new(AtomicUsize::new(0));
//!
//! let effect = {
//!     let count = count.clone();
//!     let runs = Arc::clone(&runs);
//!     Effect::new(move || {
//!         let _ = count.get();
//!         runs.fetch_add(1, Ordering::SeqCst);
//!     })
//! };
//!
//! count.set(2);
//! assert_eq!(runs.load(Ordering::SeqCst), 2);
//!
//! effect.dispose();
//! count.set(3);
//! assert_eq!(runs.load(Ordering::SeqCst), 2);
//! ```

pub mod effect;
pub mod observer;
pub mod scope;
pub mod signal;
pub mod source;

pub use effect::Effect;
pub use observer::{ReadLog, is_observing, observe, untracked};
pub use scope::Scope;
pub use signal::Signal;
pub use source::{Source, SourceId, Subscriber, Subscription, SubscriptionId};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::effect::Effect;
    pub use crate::observer::{observe, untracked};
    pub use crate::scope::Scope;
    pub use crate::signal::Signal;
    pub use crate::source::{Source, SourceId, Subscriber, Subscription};
}

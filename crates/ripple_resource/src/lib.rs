//! Reactive asynchronous resources.
//!
//! A [`Resource`] wraps one asynchronous computation whose result is exposed
//! as tri-state data ([`ResourceState`]): pending, resolved, or rejected.
//! The computation declares its reactive dependencies through the
//! [`ResourceContext`] it receives; when any of them changes the resource
//! re-invokes it, first running the cleanups the previous invocation
//! registered.
//!
//! - [`controller`] - The [`Resource`] controller and [`ComputationHandle`]
//! - [`context`] - [`ResourceContext`]: `track`, `cleanup`, abort signal
//! - [`state`] - [`ResourceState`] snapshots and [`ResourceStatus`]
//! - [`renderer`] - [`ResourceRenderer`], the three-branch presenter
//! - [`options`] - [`ResourceOptions`]
//! - [`error`] - [`ResourceError`]
//!
//! # Generations
//!
//! Each invocation is numbered. The first is generation 0 and every
//! re-invocation increments it. A result is committed only if it belongs to
//! the current generation, so a slow, superseded invocation can never
//! overwrite a newer one. Superseding does not stop the old computation;
//! it only loses the right to commit. Computations that want to stop early
//! watch their [`AbortSignal`].

pub mod abort;
mod cleanup;
pub mod context;
pub mod controller;
pub mod error;
pub mod options;
pub mod renderer;
pub mod state;

pub use abort::AbortSignal;
pub use context::ResourceContext;
pub use controller::{ComputationHandle, Resource};
pub use error::ResourceError;
pub use options::ResourceOptions;
pub use renderer::ResourceRenderer;
pub use state::{ResourceState, ResourceStatus};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::abort::AbortSignal;
    pub use crate::context::ResourceContext;
    pub use crate::controller::{ComputationHandle, Resource};
    pub use crate::error::ResourceError;
    pub use crate::options::ResourceOptions;
    pub use crate::renderer::ResourceRenderer;
    pub use crate::state::{ResourceState, ResourceStatus};
}

//! Reactive async resources for Rust.
//!
//! - [`ripple_reactive`] - Signals, effects, and scopes
//! - [`ripple_resource`] - Dependency-tracked async resources and their renderer
//! - [`ripple_core`] - Tracing setup
//!
//! # Example
//!
//! ```
//! use ripple::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let id = Signal::new(1_u32);
//! let user: Resource<String, String> = {
//!     let id = id.clone();
//!     Resource::new(move |ctx| {
//!         let id = ctx.track_signal(&id);
//!         async move { Ok(format!("user #{id}")) }
//!     })
//! };
//!
//! let state = user.settled().await;
//! assert_eq!(state.value().map(String::as_str), Some("user #1"));
//!
//! id.set(2);
//! let state = user.settled().await;
//! assert_eq!(state.value().map(String::as_str), Some("user #2"));
//! assert_eq!(state.generation(), 1);
//! # }
//! ```

/// Signals, effects, and ownership scopes.
pub use ripple_reactive;

/// Async resources, their state, and the tri-state renderer.
pub use ripple_resource;

/// Tracing subscriber setup.
pub use ripple_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use ripple_core::{TracingConfig, TracingFormat};
    pub use ripple_reactive::prelude::*;
    pub use ripple_resource::prelude::*;
}

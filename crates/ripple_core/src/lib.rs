//! Core infrastructure for Ripple.
//!
//! Currently this is the tracing setup shared by applications embedding
//! Ripple resources:
//!
//! - [`TracingConfig`] - Level, format, and filter configuration
//! - [`TracingFormat`] - Pretty, compact, or JSON output
//! - [`TracingInitError`] - Why installing the subscriber failed

mod telemetry;

pub use telemetry::{TracingConfig, TracingFormat, TracingInitError};

//! Cooperative cancellation for resource invocations.
//!
//! Every invocation receives its own [`AbortSignal`] through
//! [`ResourceContext::signal`](crate::ResourceContext::signal). The controller
//! cancels it once the invocation is superseded or the resource is torn
//! down, after the invocation's cleanup callbacks have run. Cancelling does
//! not stop the computation by itself; the computation has to watch the
//! signal, for example:
//!
//! ```ignore
//! let signal = ctx.signal();
//! tokio::select! {
//!     _ = signal.cancelled() => Err(FetchError::Cancelled),
//!     body = client.get(url).send() => parse(body).await,
//! }
//! ```

/// A token for cooperative cancellation of one invocation.
///
/// Key methods: `cancel()`, `is_cancelled()`, `cancelled().await`, and
/// `child_token()` for handing a linked token to sub-tasks.
pub type AbortSignal = tokio_util::sync::CancellationToken;

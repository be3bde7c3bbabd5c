//! Per-resource configuration.

use core::time::Duration;

/// Configuration for a [`Resource`](crate::Resource).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ripple_resource::ResourceOptions;
///
/// let options = ResourceOptions::new()
///     .with_name("user-profile")
///     .with_timeout(Duration::from_secs(5))
///     .with_retain_stale(false);
///
/// assert_eq!(options.name(), "user-profile");
/// assert_eq!(options.timeout(), Some(Duration::from_secs(5)));
/// assert!(!options.retain_stale());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResourceOptions {
    /// Label attached to log events.
    name: String,
    /// Upper bound on one invocation before it is rejected.
    timeout: Option<Duration>,
    /// Keep the last value and error visible while a new invocation is pending.
    retain_stale: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            name: String::from("resource"),
            timeout: None,
            retain_stale: true,
        }
    }
}

impl ResourceOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name used in log events.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rejects an invocation with [`ResourceError::TimedOut`](crate::ResourceError::TimedOut)
    /// once it has run for `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Controls stale-while-revalidate retention.
    #[must_use]
    pub fn with_retain_stale(mut self, retain: bool) -> Self {
        self.retain_stale = retain;
        self
    }

    /// Returns the configured name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns whether stale output is retained while pending.
    #[must_use]
    pub fn retain_stale(&self) -> bool {
        self.retain_stale
    }
}

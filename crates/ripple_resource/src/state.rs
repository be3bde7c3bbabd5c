//! Resource status and state snapshots.

use core::fmt;
use std::sync::Arc;

use crate::error::ResourceError;

/// Which of the three states a resource is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResourceStatus {
    /// An invocation is in flight.
    #[default]
    Pending,
    /// The current invocation produced a value.
    Resolved,
    /// The current invocation failed.
    Rejected,
}

impl ResourceStatus {
    /// Returns `true` for [`ResourceStatus::Pending`].
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == ResourceStatus::Pending
    }

    /// Returns `true` for [`ResourceStatus::Resolved`].
    #[must_use]
    pub fn is_resolved(self) -> bool {
        self == ResourceStatus::Resolved
    }

    /// Returns `true` for [`ResourceStatus::Rejected`].
    #[must_use]
    pub fn is_rejected(self) -> bool {
        self == ResourceStatus::Rejected
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Resolved => "resolved",
            ResourceStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// A snapshot of a resource's tri-state output.
///
/// Exactly one [`ResourceStatus`] holds at a time. [`value`](Self::value) is
/// only defined while `Resolved` and [`error`](Self::error) only while
/// `Rejected`. The most recent value and error are additionally retained
/// across later invocations (unless the resource was configured otherwise)
/// and exposed through [`latest_value`](Self::latest_value) and
/// [`latest_error`](Self::latest_error), so a consumer can keep showing
/// stale content while a new invocation is pending.
///
/// Values and errors are reference counted, which keeps snapshots cheap and
/// lets renderers detect real changes by identity.
pub struct ResourceState<T, E> {
    status: ResourceStatus,
    value: Option<Arc<T>>,
    error: Option<Arc<ResourceError<E>>>,
    generation: u64,
}

impl<T, E> ResourceState<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            status: ResourceStatus::Pending,
            value: None,
            error: None,
            generation: 0,
        }
    }

    /// Enters `Pending` for a fresh invocation.
    pub(crate) fn begin(&mut self, generation: u64, retain_stale: bool) {
        self.status = ResourceStatus::Pending;
        self.generation = generation;
        if !retain_stale {
            self.value = None;
            self.error = None;
        }
    }

    /// Commits the outcome of the current invocation.
    pub(crate) fn commit(&mut self, outcome: Result<T, ResourceError<E>>) {
        match outcome {
            Ok(value) => {
                self.status = ResourceStatus::Resolved;
                self.value = Some(Arc::new(value));
                self.error = None;
            }
            Err(error) => {
                self.status = ResourceStatus::Rejected;
                self.error = Some(Arc::new(error));
            }
        }
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    /// Returns `true` while an invocation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.is_pending()
    }

    /// Returns the value, only while `Resolved`.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self.status {
            ResourceStatus::Resolved => self.value.as_deref(),
            _ => None,
        }
    }

    /// Returns the error, only while `Rejected`.
    #[must_use]
    pub fn error(&self) -> Option<&ResourceError<E>> {
        match self.status {
            ResourceStatus::Rejected => self.error.as_deref(),
            _ => None,
        }
    }

    /// Returns the most recently resolved value, whatever the status.
    #[must_use]
    pub fn latest_value(&self) -> Option<&T> {
        self.value.as_deref()
    }

    /// Returns the most recent rejection, whatever the status.
    #[must_use]
    pub fn latest_error(&self) -> Option<&ResourceError<E>> {
        self.error.as_deref()
    }

    /// Returns the generation of the invocation this snapshot belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn value_handle(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    pub(crate) fn error_handle(&self) -> Option<&Arc<ResourceError<E>>> {
        self.error.as_ref()
    }
}

impl<T, E> Clone for ResourceState<T, E> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            generation: self.generation,
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for ResourceState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceState")
            .field("status", &self.status)
            .field("value", &self.value)
            .field("error", &self.error)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = ResourceState<i32, String>;

    #[test]
    fn starts_pending_with_nothing() {
        let state = State::new();
        assert!(state.is_loading());
        assert!(state.value().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn value_is_hidden_while_pending_but_retained() {
        let mut state = State::new();
        state.commit(Ok(1));
        state.begin(1, true);

        assert_eq!(state.status(), ResourceStatus::Pending);
        assert_eq!(state.value(), None);
        assert_eq!(state.latest_value(), Some(&1));
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn retain_stale_false_clears_on_begin() {
        let mut state = State::new();
        state.commit(Err(ResourceError::Aborted));
        state.begin(1, false);

        assert!(state.latest_error().is_none());
        assert!(state.latest_value().is_none());
    }

    #[test]
    fn resolve_clears_error_and_reject_keeps_value() {
        let mut state = State::new();
        state.commit(Err(ResourceError::Failed("first".into())));
        state.commit(Ok(2));
        assert!(state.latest_error().is_none());

        state.commit(Err(ResourceError::Aborted));
        assert_eq!(state.status(), ResourceStatus::Rejected);
        assert_eq!(state.value(), None);
        assert_eq!(state.latest_value(), Some(&2));
        assert!(state.error().is_some_and(ResourceError::is_aborted));
    }

    #[test]
    fn status_display() {
        assert_eq!(ResourceStatus::Pending.to_string(), "pending");
        assert_eq!(ResourceStatus::Resolved.to_string(), "resolved");
        assert_eq!(ResourceStatus::Rejected.to_string(), "rejected");
    }
}

//! Error types surfaced through a rejected resource.

use core::time::Duration;

/// Why a resource invocation ended in the `Rejected` state.
///
/// None of these are faults of the controller itself; they are the
/// computation's outcome, delivered as data.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError<E> {
    /// The computation returned an error.
    #[error("computation failed: {0}")]
    Failed(E),

    /// The invocation was aborted before it settled.
    #[error("computation aborted")]
    Aborted,

    /// The invocation exceeded its configured timeout.
    #[error("computation timed out after {0:?}")]
    TimedOut(Duration),

    /// The computation panicked.
    #[error("computation panicked: {0}")]
    Panicked(String),
}

impl<E> ResourceError<E> {
    /// Returns the computation's own error, if that is what this is.
    #[must_use]
    pub fn failure(&self) -> Option<&E> {
        match self {
            ResourceError::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` for [`ResourceError::Aborted`].
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, ResourceError::Aborted)
    }

    /// Returns `true` for [`ResourceError::TimedOut`].
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResourceError::TimedOut(_))
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

//! Error types used by subscribed callbacks.
//!
//! The emitter never returns these to the caller of `emit`: a failing callback is
//! contained at its execution boundary. They are only surfaced to observers through
//! [`Diagnostic`](crate::Diagnostic) values.
//!
//! Helper methods (`as_label`, `as_message`) mirror the ones used for logs/metrics.

use thiserror::Error;

/// # Errors produced by a subscribed callback.
///
/// A callback reports failure by returning one of these. Panics are caught separately
/// and reported as [`CallbackError::Panicked`] by the runtime, never by user code.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// Callback ran and failed.
    #[error("callback failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Callback panicked while running; the panic was caught.
    #[error("callback panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl CallbackError {
    /// Shorthand for [`CallbackError::Fail`].
    ///
    /// # Example
    /// ```
    /// use eventvisor::CallbackError;
    ///
    /// let err = CallbackError::fail("db unavailable");
    /// assert_eq!(err.to_string(), "callback failed: db unavailable");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        CallbackError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::CallbackError;
    ///
    /// let err = CallbackError::Panicked { info: "boom".into() };
    /// assert_eq!(err.as_label(), "callback_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CallbackError::Fail { .. } => "callback_failed",
            CallbackError::Panicked { .. } => "callback_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallbackError::Fail { error } => format!("error: {error}"),
            CallbackError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Builds a [`CallbackError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        CallbackError::Panicked {
            info: panic_message(payload),
        }
    }
}

impl From<String> for CallbackError {
    fn from(error: String) -> Self {
        CallbackError::Fail { error }
    }
}

impl From<&str> for CallbackError {
    fn from(error: &str) -> Self {
        CallbackError::Fail {
            error: error.to_string(),
        }
    }
}

/// Renders a panic payload (`&'static str`, `String`, or anything else).
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

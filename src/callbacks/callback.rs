//! # Callback abstraction.
//!
//! A [`Callback`] is invoked once per trigger with a clone of the emitted arguments and
//! hands back a boxed future. The invocation itself happens synchronously inside
//! `emit`, in registration order; the returned future is driven on the Tokio runtime.
//!
//! The common handle type is [`CallbackRef`], an `Arc<dyn Callback<A>>` suitable for
//! sharing across executions.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::error::CallbackError;

/// Boxed future returned by [`Callback::call`].
pub type BoxCallbackFuture =
    Pin<Box<dyn Future<Output = Result<(), CallbackError>> + Send + 'static>>;

/// Shared handle to a callback.
pub type CallbackRef<A> = Arc<dyn Callback<A>>;

/// # Triggerable unit of work.
///
/// Implementors receive the emitted arguments by value. Errors returned from the future
/// (and panics raised while polling it) are contained by the emitter and never reach the
/// caller of `emit`.
///
/// # Example
/// ```
/// use eventvisor::{BoxCallbackFuture, Callback};
///
/// struct Printer;
///
/// impl Callback<String> for Printer {
///     fn call(&self, line: String) -> BoxCallbackFuture {
///         Box::pin(async move {
///             println!("{line}");
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Callback<A>: Send + Sync + 'static {
    /// Starts one run with the given arguments.
    ///
    /// Called from the emitting context; keep the synchronous part short and move real
    /// work into the returned future.
    fn call(&self, args: A) -> BoxCallbackFuture;
}

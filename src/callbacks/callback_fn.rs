//! # Function-backed callback (`CallbackFn`)
//!
//! [`CallbackFn`] wraps a closure `F: Fn(A) -> Fut`, producing a fresh future per
//! trigger. No state is shared between runs unless the closure captures an `Arc<...>`
//! explicitly.
//!
//! ## Example
//! ```rust
//! use eventvisor::{CallbackError, CallbackFn, CallbackRef};
//!
//! let cb: CallbackRef<u32> = CallbackFn::arc(|n: u32| async move {
//!     if n == 0 {
//!         return Err(CallbackError::fail("zero"));
//!     }
//!     Ok(())
//! });
//! # let _ = cb;
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::callbacks::callback::{BoxCallbackFuture, Callback};
use crate::error::CallbackError;

/// Function-backed callback implementation.
///
/// Wraps a closure that *creates* a new future per trigger.
#[derive(Debug)]
pub struct CallbackFn<F> {
    f: F,
}

impl<F> CallbackFn<F> {
    /// Creates a new function-backed callback.
    ///
    /// Prefer [`CallbackFn::arc`] when you immediately need a
    /// [`CallbackRef`](crate::CallbackRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the callback and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<A, F, Fut> Callback<A> for CallbackFn<F>
where
    F: Fn(A) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
{
    fn call(&self, args: A) -> BoxCallbackFuture {
        let fut = (self.f)(args);
        Box::pin(fut)
    }
}

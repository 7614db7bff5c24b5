//! # Callback abstractions.
//!
//! This module provides the callable side of a subscription:
//! - [`Callback`] - trait for anything that can be triggered by an emission
//! - [`CallbackFn`] - closure-backed implementation
//! - [`CallbackRef`] - shared reference to a callback (`Arc<dyn Callback<A>>`)

mod callback;
mod callback_fn;

pub use callback::{BoxCallbackFuture, Callback, CallbackRef};
pub use callback_fn::CallbackFn;

//! Dispatch core: registry, events and executions.
//!
//! The only public entry point from this module is [`Emitter`] (plus its builder,
//! config and the read-only execution views).
//!
//! Internal modules:
//! - [`registry`]: the emitter and its event map;
//! - [`event`]: registration-ordered buckets and fan-out;
//! - [`execution`]: per-subscription state machine, guards and expiration timer;
//! - [`builder`]: emitter construction with observers;
//! - [`config`]: emitter settings.

mod builder;
mod config;
mod event;
mod execution;
mod registry;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use builder::EmitterBuilder;
pub use config::EmitterConfig;
pub use execution::{ExecutionSnapshot, ExecutionState};
pub use registry::Emitter;

/// Creation-order id of an event object within its emitter.
pub type EventId = u64;

/// Id of an execution, unique within its emitter and never reused.
pub type ExecutionId = u64;

/// Non-owning path back to the registry, used by handles and executions to detach.
pub(crate) trait Detach: Send + Sync {
    /// Removes one execution. Returns `false` if it was not registered.
    fn detach(&self, event: &str, execution: ExecutionId) -> bool;

    /// True while the execution is registered.
    fn is_attached(&self, event: &str, execution: ExecutionId) -> bool;
}

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// No lock in this crate is held while user code runs.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

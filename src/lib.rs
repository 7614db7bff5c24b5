//! # eventvisor
//!
//! **eventvisor** is an in-process named-event dispatch core for Tokio applications.
//!
//! Independent parts of a program subscribe callbacks to string-named events, emit
//! events with arbitrary arguments, and control each subscription's lifecycle:
//! one-shot execution, time-based expiration, reentrancy suppression and manual
//! cancellation.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscribe(name, cb, opts)                    emit(name, args)
//!            │                                          │
//!            ▼                                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Emitter (one isolated bus)                                       │
//! │  - events: name → Event (created on demand, dropped when empty)   │
//! │  - monotonic event / execution ids (never reused)                 │
//! │  - ObserverSet (diagnostics fan-out)                              │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ Event A  │       │ Event B  │       │ Event C  │
//!   └┬────┬────┘       └┬─────────┘       └┬────┬────┘
//!    ▼    ▼             ▼                  ▼    ▼
//!   Ex1  Ex2           Ex3                Ex4  Ex5      (registration order)
//!    │
//!    ├─► guards: one-shot / expiration timer / single instance
//!    └─► callback(args) ──► spawned future ──► Ok / Err / panic (contained)
//!                                                  │
//!                                                  ▼
//!                                      Diagnostic ──► ObserverSet ──► observers
//! ```
//!
//! ### Lifecycle
//! ```text
//! subscribe ──► Execution (Armed if expiring, else Idle)
//!
//! emit ──► snapshot executions ──► for each, in order:
//!   ├─► removed since snapshot?          ─► skip
//!   ├─► disarm expiration (always)
//!   ├─► single instance and running?     ─► drop (TriggerDropped)
//!   ├─► one-shot already started?        ─► drop (TriggerDropped)
//!   └─► invoke callback, spawn its future
//!           └─► on completion: has_executed = true
//!                              one-shot? ─► detach
//!
//! expiration timer fires (still armed) ──► on_expire() ──► detach
//! handle.remove()                      ──► detach + disarm (in-flight run continues)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                            |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------|
//! | **Registry**      | Subscribe, emit, unsubscribe, introspect.                    | [`Emitter`], [`EmitterBuilder`]               |
//! | **Callbacks**     | Closures or trait objects returning futures.                 | [`Callback`], [`CallbackFn`], [`CallbackRef`] |
//! | **Lifecycle**     | One-shot, expiration, single instance, manual removal.       | [`SubscribeOptions`], [`SubscriptionHandle`]  |
//! | **Diagnostics**   | Observe contained failures, dropped triggers, expirations.   | [`Observe`], [`Diagnostic`]                   |
//! | **Errors**        | Typed callback errors.                                       | [`CallbackError`]                             |
//! | **Configuration** | Emitter name and default subscription options.               | [`EmitterConfig`]                             |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], an observer that renders diagnostics
//!   through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{CallbackError, Emitter, Expiration, SubscribeOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus: Emitter<u64> = Emitter::named("orders");
//!
//!     // Runs on every emission; a failure never reaches `emit`.
//!     bus.on("order.paid", |id: u64| async move {
//!         if id == 0 {
//!             return Err(CallbackError::fail("invalid order"));
//!         }
//!         Ok(())
//!     });
//!
//!     // Runs once, but only if the event arrives within a second.
//!     bus.subscribe(
//!         "order.paid",
//!         |_id: u64| async { Ok(()) },
//!         SubscribeOptions::once()
//!             .expire_after(Expiration::after(Duration::from_secs(1)).on_expire(|| {
//!                 eprintln!("no payment in time");
//!             })),
//!     );
//!
//!     bus.emit("order.paid", 42);
//!     bus.emit("nobody.listens", 7); // no-op
//! }
//! ```
mod callbacks;
mod core;
mod diagnostics;
mod error;
mod subscription;

pub mod timefmt;

// ---- Public re-exports ----

pub use callbacks::{BoxCallbackFuture, Callback, CallbackFn, CallbackRef};
pub use crate::core::{
    Emitter, EmitterBuilder, EmitterConfig, EventId, ExecutionId, ExecutionSnapshot,
    ExecutionState,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Observe, ObserverSet};
pub use error::CallbackError;
pub use subscription::{ExpireFn, Expiration, SubscribeOptions, SubscriptionHandle};

// Optional: built-in tracing observer.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use diagnostics::LogWriter;

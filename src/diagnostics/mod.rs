//! # Diagnostics: observing what the dispatch core contains.
//!
//! A failing callback never reaches the caller of `emit`. To keep that isolation
//! testable and operable, the core publishes a [`Diagnostic`] for every contained
//! failure, dropped trigger and expiration to the observers registered on the emitter.
//!
//! ## Architecture
//! ```text
//! Execution ── publish(Diagnostic) ──► ObserverSet ──► [queue] ──► Observe::on_diagnostic
//!                                                     └─► panic caught → ObserverPanicked
//! ```
//!
//! ## Contents
//! - [`DiagnosticKind`], [`Diagnostic`] classification and metadata
//! - [`Observe`] the observer extension point
//! - [`ObserverSet`] per-observer queues and workers
//! - `LogWriter` built-in `tracing` observer (feature `logging`)

mod diagnostic;
#[cfg(feature = "logging")]
mod log;
mod observer;
mod set;

pub use diagnostic::{Diagnostic, DiagnosticKind};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::Observe;
pub use set::ObserverSet;

//! # Diagnostic observer trait.
//!
//! Provides [`Observe`], the extension point for watching what the dispatch core
//! swallows: callback failures, dropped triggers, expirations.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently of `emit`)
//! - **Per-observer bounded queue** (capacity via [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `DiagnosticKind::ObserverPanicked`)
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use eventvisor::{Diagnostic, DiagnosticKind, Observe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Observe for FailureCounter {
//!     async fn on_diagnostic(&self, d: &Diagnostic) {
//!         if matches!(d.kind, DiagnosticKind::CallbackFailed) {
//!             // bump a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::diagnostics::Diagnostic;

/// Diagnostic observer.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this observer's queue.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Processes a single diagnostic.
    ///
    /// Called from a dedicated worker task, in FIFO order per observer.
    async fn on_diagnostic(&self, diagnostic: &Diagnostic);

    /// Returns the observer name used in overflow/panic diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this observer.
    ///
    /// On overflow the new diagnostic is dropped for this observer only and an
    /// `ObserverOverflow` is published to the others. Clamped to a minimum of 1.
    ///
    /// Default: 256.
    fn queue_capacity(&self) -> usize {
        256
    }
}

//! # Diagnostics emitted by the dispatch core.
//!
//! The [`DiagnosticKind`] enum classifies what happened:
//! - **Callback outcomes**: a run failed or panicked (contained, never re-raised)
//! - **Guard decisions**: a trigger was dropped by a reentrancy/one-shot guard
//! - **Lifecycle**: an execution expired before being triggered
//! - **Observer health**: an observer panicked or could not keep up
//!
//! The [`Diagnostic`] struct carries the metadata: emitter, event name, execution id and
//! a human-readable error.
//!
//! ## Ordering guarantees
//! Each diagnostic has a globally unique sequence number (`seq`) that increases
//! monotonically. Observers see diagnostics through independent queues, so use `seq` to
//! restore the exact order across observers.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Diagnostic, DiagnosticKind};
//!
//! let d = Diagnostic::new(DiagnosticKind::CallbackFailed)
//!     .with_emitter("bus")
//!     .with_event("user.created")
//!     .with_execution(3)
//!     .with_error("db unavailable");
//!
//! assert_eq!(d.kind, DiagnosticKind::CallbackFailed);
//! assert_eq!(d.event.as_deref(), Some("user.created"));
//! assert_eq!(d.execution, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::{DateTime, Utc};

use crate::core::ExecutionId;

/// Global sequence counter for diagnostic ordering.
static DIAGNOSTIC_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    // === Callback outcomes ===
    /// A callback returned `Err`; the error was swallowed.
    ///
    /// Sets: `emitter`, `event`, `execution`, `error`.
    CallbackFailed,

    /// A callback panicked (while being invoked or while its future was polled).
    ///
    /// Sets: `emitter`, `event`, `execution`, `error` (panic message).
    CallbackPanicked,

    // === Guard decisions ===
    /// A trigger arrived while the execution was not allowed to start another run
    /// (single-instance guard, or a one-shot that already started).
    ///
    /// Sets: `emitter`, `event`, `execution`.
    TriggerDropped,

    // === Lifecycle ===
    /// The expiration timer fired before any trigger; the execution was removed.
    ///
    /// Sets: `emitter`, `event`, `execution`, `timeout_ms`.
    ExecutionExpired,

    /// The `on_expire` handler panicked; the execution was removed anyway.
    ///
    /// Sets: `emitter`, `event`, `execution`, `error` (panic message).
    ExpireHandlerPanicked,

    // === Observer health ===
    /// An observer panicked while handling a diagnostic.
    ///
    /// Sets: `observer`, `error` (panic message).
    ObserverPanicked,

    /// An observer dropped a diagnostic (queue full or worker closed).
    ///
    /// Sets: `observer`, `error` ("full" or "closed").
    ObserverOverflow,
}

/// Diagnostic record with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`DiagnosticKind`]
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: DateTime<Utc>,
    /// Diagnostic classification.
    pub kind: DiagnosticKind,

    /// Name of the emitter that produced it.
    pub emitter: Option<Arc<str>>,
    /// Event name, if applicable.
    pub event: Option<Arc<str>>,
    /// Execution id, if applicable.
    pub execution: Option<ExecutionId>,
    /// Observer name (observer health diagnostics only).
    pub observer: Option<&'static str>,
    /// Configured expiration timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable error (callback failure, panic info, overflow reason).
    pub error: Option<Arc<str>>,
}

impl Diagnostic {
    /// Creates a new diagnostic with current timestamp and next sequence number.
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            seq: DIAGNOSTIC_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: Utc::now(),
            kind,
            emitter: None,
            event: None,
            execution: None,
            observer: None,
            timeout_ms: None,
            error: None,
        }
    }

    /// Attaches the emitter name.
    #[inline]
    pub fn with_emitter(mut self, emitter: impl Into<Arc<str>>) -> Self {
        self.emitter = Some(emitter.into());
        self
    }

    /// Attaches an event name.
    #[inline]
    pub fn with_event(mut self, event: impl Into<Arc<str>>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Attaches an execution id.
    #[inline]
    pub fn with_execution(mut self, id: ExecutionId) -> Self {
        self.execution = Some(id);
        self
    }

    /// Attaches a human-readable error.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: std::time::Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates an observer overflow diagnostic.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        let mut d = Diagnostic::new(DiagnosticKind::ObserverOverflow).with_error(reason);
        d.observer = Some(observer);
        d
    }

    /// Creates an observer panic diagnostic.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        let mut d = Diagnostic::new(DiagnosticKind::ObserverPanicked).with_error(info);
        d.observer = Some(observer);
        d
    }

    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, DiagnosticKind::ObserverOverflow)
    }
}

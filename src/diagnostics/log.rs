//! # LogWriter: diagnostics rendered through `tracing`
//!
//! A minimal observer that turns every [`Diagnostic`] into a `tracing` record. The
//! dispatch core itself never logs callback failures; install this observer to see them.
//!
//! ## Levels
//! - `CallbackPanicked`, `ObserverPanicked`, `ExpireHandlerPanicked` → `error`
//! - `CallbackFailed`, `ObserverOverflow` → `warn`
//! - `ExecutionExpired` → `info`
//! - `TriggerDropped` → `debug`
//!
//! ## Example output (fmt subscriber)
//! ```text
//! WARN eventvisor: callback failed at="2026-10-19 08:15:02.114" emitter="bus" event="user.created" execution=3 err="db unavailable"
//! INFO eventvisor: execution expired at="2026-10-19 08:15:03.002" emitter="bus" event="ready" execution=7 timeout_ms=50
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Observe};
use crate::timefmt;

/// Diagnostic writer observer.
pub struct LogWriter {
    template: String,
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWriter {
    /// Construct a new [`LogWriter`] using [`timefmt::DEFAULT_TEMPLATE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            template: timefmt::DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Overrides the timestamp template (see [`timefmt`]).
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_diagnostic(&self, d: &Diagnostic) {
        let at = timefmt::format(&d.at.with_timezone(&chrono::Local), &self.template);
        let emitter = d.emitter.as_deref().unwrap_or("-");
        let event = d.event.as_deref().unwrap_or("-");
        let err = d.error.as_deref().unwrap_or("-");

        match d.kind {
            DiagnosticKind::CallbackFailed => {
                warn!(%at, emitter, event, execution = ?d.execution, err, "callback failed");
            }
            DiagnosticKind::CallbackPanicked => {
                error!(%at, emitter, event, execution = ?d.execution, err, "callback panicked");
            }
            DiagnosticKind::TriggerDropped => {
                debug!(%at, emitter, event, execution = ?d.execution, "trigger dropped");
            }
            DiagnosticKind::ExecutionExpired => {
                info!(%at, emitter, event, execution = ?d.execution, timeout_ms = ?d.timeout_ms, "execution expired");
            }
            DiagnosticKind::ExpireHandlerPanicked => {
                error!(%at, emitter, event, execution = ?d.execution, err, "expire handler panicked");
            }
            DiagnosticKind::ObserverPanicked => {
                error!(%at, observer = d.observer.unwrap_or("unknown"), err, "observer panicked");
            }
            DiagnosticKind::ObserverOverflow => {
                warn!(%at, observer = d.observer.unwrap_or("unknown"), reason = err, "observer dropped diagnostic");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

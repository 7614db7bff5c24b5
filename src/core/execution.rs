//! # Execution: one subscribed callback and its lifecycle.
//!
//! An execution owns its guards (one-shot, expiration, single instance) and its
//! runtime state. Everything it mutates lives behind its own mutex, so triggers
//! from `emit`, removals from a handle and the expiration timer may race on any
//! thread without corrupting the single-instance guard.
//!
//! ## State machine
//! ```text
//!            trigger (disarms timer)
//!   Armed ─────────────────────────────► Running ◄──┐
//!     │                                   │   │     │ trigger (no single-instance guard)
//!     │ timer fires                       │   └─────┘
//!     │   → on_expire()                   │
//!     │   → detach                        │ callback completes (Ok / Err / panic)
//!     ▼                                   ▼
//!  Removed ◄──── one-shot completed ──── Idle ◄──── trigger ─── (back to Running)
//!     ▲
//!     └──── handle.remove() from any state (in-flight run is not interrupted)
//! ```
//!
//! ## Rules
//! - A trigger **always** disarms a pending expiration, even when the run is dropped.
//! - With `only_one_at_a_time`, a trigger during a run is dropped (no queue, no error).
//! - A one-shot starts at most one run; it is removed as soon as that run completes.
//! - Callback errors and panics are contained here and only reported to observers.
//! - The callback is invoked without holding any lock (it may re-enter the emitter).

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::callbacks::CallbackRef;
use crate::core::{Detach, ExecutionId, lock};
use crate::diagnostics::{Diagnostic, DiagnosticKind, ObserverSet};
use crate::error::CallbackError;
use crate::subscription::{ExpireFn, SubscribeOptions};

/// Observable lifecycle state of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Registered, expiration timer running, never triggered.
    Armed,
    /// Registered, no run in flight, no timer armed.
    Idle,
    /// At least one run in flight.
    Running,
    /// Detached from its event; terminal.
    Removed,
}

/// Point-in-time view of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSnapshot {
    /// Execution id.
    pub id: ExecutionId,
    /// Lifecycle state.
    pub state: ExecutionState,
    /// True once at least one run has completed.
    pub has_executed: bool,
    /// Number of runs currently in flight.
    pub in_flight: usize,
}

/// Result of offering a trigger to an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// Callback invoked.
    Started,
    /// A guard rejected the trigger.
    Dropped,
    /// Execution was removed after the fan-out snapshot was taken.
    Skipped,
}

/// Mutable runtime state, guarded by the execution's mutex.
#[derive(Default)]
struct RuntimeState {
    in_flight: usize,
    started: bool,
    has_executed: bool,
    /// Present only while the expiration guard is armed.
    expiry: Option<CancellationToken>,
    removed: bool,
}

/// Shared context every execution needs to report and detach itself.
#[derive(Clone)]
pub(crate) struct ExecutionContext {
    pub emitter: Arc<str>,
    pub registry: Weak<dyn Detach>,
    pub observers: Arc<ObserverSet>,
}

pub(crate) struct Execution<A> {
    id: ExecutionId,
    event: Arc<str>,
    callback: CallbackRef<A>,
    remove_after_execute: bool,
    only_one_at_a_time: bool,
    expire_after: Option<Duration>,
    on_expire: Option<ExpireFn>,
    state: Mutex<RuntimeState>,
    ctx: ExecutionContext,
}

impl<A> Execution<A> {
    pub(crate) fn id(&self) -> ExecutionId {
        self.id
    }

    /// Marks the execution removed and disarms its timer. Idempotent.
    ///
    /// Called by the registry after it has detached the execution.
    pub(crate) fn cancel(&self) {
        let mut st = lock(&self.state);
        st.removed = true;
        if let Some(token) = st.expiry.take() {
            token.cancel();
        }
    }

    pub(crate) fn snapshot(&self) -> ExecutionSnapshot {
        let st = lock(&self.state);
        let state = if st.removed {
            ExecutionState::Removed
        } else if st.in_flight > 0 {
            ExecutionState::Running
        } else if st.expiry.is_some() {
            ExecutionState::Armed
        } else {
            ExecutionState::Idle
        };

        ExecutionSnapshot {
            id: self.id,
            state,
            has_executed: st.has_executed,
            in_flight: st.in_flight,
        }
    }
}

impl<A: Send + 'static> Execution<A> {
    /// Creates an execution. If expiration is configured it starts `Armed`; call
    /// [`Execution::arm`] once it is registered to start the timer.
    pub(crate) fn new(
        id: ExecutionId,
        event: Arc<str>,
        callback: CallbackRef<A>,
        options: &SubscribeOptions,
        ctx: ExecutionContext,
    ) -> Arc<Self> {
        let expire_after = options.expiration_timeout();
        let state = RuntimeState {
            expiry: expire_after.map(|_| CancellationToken::new()),
            ..RuntimeState::default()
        };

        Arc::new(Self {
            id,
            event,
            callback,
            remove_after_execute: options.remove_after_execute,
            only_one_at_a_time: options.only_one_instance,
            expire_after,
            on_expire: options.expire_after.as_ref().and_then(|e| e.handler()),
            state: Mutex::new(state),
            ctx,
        })
    }

    /// Starts the expiration timer, if one is configured and still armed.
    ///
    /// Outside a Tokio runtime the guard is dropped and the execution stays registered.
    pub(crate) fn arm(self: &Arc<Self>) {
        let Some(timeout) = self.expire_after else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            lock(&self.state).expiry = None;
            debug!(emitter = %self.ctx.emitter, event = %self.event, execution = self.id, "no tokio runtime, expiration not armed");
            return;
        };
        let Some(token) = lock(&self.state).expiry.clone() else {
            return;
        };

        let me = Arc::downgrade(self);
        handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    if let Some(exec) = me.upgrade() {
                        exec.expire();
                    }
                }
            }
        });
    }

    /// Offers one trigger. Invokes the callback in the caller's context and spawns the
    /// returned future. The caller checks for a Tokio runtime first.
    pub(crate) fn trigger(self: &Arc<Self>, args: A) -> Trigger {
        {
            let mut st = lock(&self.state);
            if st.removed {
                return Trigger::Skipped;
            }
            if let Some(token) = st.expiry.take() {
                token.cancel();
            }

            let busy = self.only_one_at_a_time && st.in_flight > 0;
            let spent = self.remove_after_execute && st.started;
            if busy || spent {
                drop(st);
                trace!(emitter = %self.ctx.emitter, event = %self.event, execution = self.id, busy, spent, "trigger dropped");
                self.publish(Diagnostic::new(DiagnosticKind::TriggerDropped));
                return Trigger::Dropped;
            }

            st.in_flight += 1;
            st.started = true;
        }

        let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| self.callback.call(args))) {
            Ok(fut) => fut,
            Err(panic_err) => {
                self.complete(Err(CallbackError::from_panic(panic_err.as_ref())));
                return Trigger::Started;
            }
        };

        let me = Arc::clone(self);
        tokio::spawn(async move {
            let res = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res,
                Err(panic_err) => Err(CallbackError::from_panic(panic_err.as_ref())),
            };
            me.complete(res);
        });
        Trigger::Started
    }

    /// Run finished (normally, with an error, or by panicking).
    fn complete(&self, res: Result<(), CallbackError>) {
        if let Err(err) = res {
            let kind = match err {
                CallbackError::Panicked { .. } => DiagnosticKind::CallbackPanicked,
                _ => DiagnosticKind::CallbackFailed,
            };
            self.publish(Diagnostic::new(kind).with_error(err.to_string()));
        }

        let one_shot_done = {
            let mut st = lock(&self.state);
            st.in_flight = st.in_flight.saturating_sub(1);
            st.has_executed = true;
            if self.remove_after_execute && !st.removed {
                st.removed = true;
                true
            } else {
                false
            }
        };

        if one_shot_done {
            trace!(emitter = %self.ctx.emitter, event = %self.event, execution = self.id, "one-shot completed");
            self.detach();
        }
    }

    /// Timer fired: `on_expire()` first, then detach.
    fn expire(&self) {
        {
            let mut st = lock(&self.state);
            if st.removed || st.expiry.take().is_none() {
                return;
            }
            st.removed = true;
        }

        debug!(emitter = %self.ctx.emitter, event = %self.event, execution = self.id, timeout = ?self.expire_after, "execution expired");

        if let Some(handler) = &self.on_expire {
            if let Err(panic_err) = std::panic::catch_unwind(AssertUnwindSafe(|| (**handler)())) {
                let info = crate::error::panic_message(panic_err.as_ref());
                self.publish(Diagnostic::new(DiagnosticKind::ExpireHandlerPanicked).with_error(info));
            }
        }

        let mut d = Diagnostic::new(DiagnosticKind::ExecutionExpired);
        if let Some(timeout) = self.expire_after {
            d = d.with_timeout(timeout);
        }
        self.publish(d);
        self.detach();
    }

    fn detach(&self) {
        if let Some(registry) = self.ctx.registry.upgrade() {
            registry.detach(&self.event, self.id);
        }
    }

    fn publish(&self, d: Diagnostic) {
        if self.ctx.observers.is_empty() {
            return;
        }
        self.ctx.observers.publish(
            d.with_emitter(Arc::clone(&self.ctx.emitter))
                .with_event(Arc::clone(&self.event))
                .with_execution(self.id),
        );
    }
}

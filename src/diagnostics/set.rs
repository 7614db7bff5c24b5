//! # ObserverSet: non-blocking fan-out of diagnostics
//!
//! [`ObserverSet`] distributes each [`Diagnostic`] to every registered observer
//! **without awaiting** their processing, so the dispatch core never waits on
//! observability code.
//!
//! ## What it guarantees
//! - `publish(..)` returns immediately.
//! - Per-observer FIFO (queue order).
//! - Panics inside observers are caught and re-published as `ObserverPanicked`.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different observers (use `Diagnostic::seq`).
//! - No retries on per-observer queue overflow (the diagnostic is dropped for that
//!   observer and `ObserverOverflow` is published to the rest).
//!
//! ## Diagram
//! ```text
//!    publish(Diagnostic)
//!        │                        (Arc-clone per observer)
//!        ├────────────────► [queue O1] ─► worker O1 ─► on_diagnostic()
//!        ├────────────────► [queue O2] ─► worker O2 ─► on_diagnostic()
//!        └────────────────► [queue ON] ─► worker ON ─► on_diagnostic()
//! ```

use std::sync::{Arc, Mutex, Weak};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::lock;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Observe};
use crate::error::panic_message;

/// Per-observer channel metadata.
struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Diagnostic>>,
}

/// Composite fan-out with per-observer bounded queues and worker tasks.
pub struct ObserverSet {
    channels: Mutex<Vec<ObserverChannel>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    count: usize,
}

impl ObserverSet {
    /// Creates a new set and spawns one worker task per observer.
    ///
    /// # Panics
    /// Spawning workers requires a Tokio runtime when `observers` is non-empty.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let count = observers.len();
            let mut channels = Vec::with_capacity(count);
            let mut workers = Vec::with_capacity(count);

            for obs in observers {
                let cap = obs.queue_capacity().max(1);
                let name = obs.name();
                let (tx, mut rx) = mpsc::channel::<Arc<Diagnostic>>(cap);
                let set = me.clone();

                let handle = tokio::spawn(async move {
                    while let Some(d) = rx.recv().await {
                        let fut = obs.on_diagnostic(d.as_ref());
                        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                            // Panicking on a panic report would loop forever.
                            if matches!(d.kind, DiagnosticKind::ObserverPanicked) {
                                continue;
                            }
                            if let Some(set) = set.upgrade() {
                                let info = panic_message(panic_err.as_ref());
                                set.publish(Diagnostic::observer_panicked(obs.name(), info));
                            }
                        }
                    }
                });

                channels.push(ObserverChannel { name, sender: tx });
                workers.push(handle);
            }

            Self {
                channels: Mutex::new(channels),
                workers: Mutex::new(workers),
                count,
            }
        })
    }

    /// Creates a set with no observers (publishing is a no-op).
    #[must_use]
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            channels: Mutex::new(Vec::new()),
            workers: Mutex::new(Vec::new()),
            count: 0,
        })
    }

    /// Fans out one diagnostic to all observers (non-blocking).
    pub fn publish(&self, diagnostic: Diagnostic) {
        if self.is_empty() {
            return;
        }
        self.publish_arc(Arc::new(diagnostic));
    }

    /// Fans out a pre-allocated `Arc<Diagnostic>`.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full/closed: drops it for that observer, publishes `ObserverOverflow`
    ///
    /// Overflow diagnostics are never re-published when they themselves overflow.
    pub fn publish_arc(&self, diagnostic: Arc<Diagnostic>) {
        let dropped: Vec<(&'static str, &'static str)> = {
            let channels = lock(&self.channels);
            channels
                .iter()
                .filter_map(|ch| match ch.sender.try_send(Arc::clone(&diagnostic)) {
                    Ok(()) => None,
                    Err(mpsc::error::TrySendError::Full(_)) => Some((ch.name, "full")),
                    Err(mpsc::error::TrySendError::Closed(_)) => Some((ch.name, "closed")),
                })
                .collect()
        };

        if diagnostic.is_observer_overflow() {
            return;
        }
        for (name, reason) in dropped {
            self.publish_arc(Arc::new(Diagnostic::observer_overflow(name, reason)));
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    ///
    /// Diagnostics already queued are still delivered. Later publishes are dropped.
    pub async fn shutdown(&self) {
        drop(std::mem::take(&mut *lock(&self.channels)));
        let workers = std::mem::take(&mut *lock(&self.workers));
        for h in workers {
            let _ = h.await;
        }
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use eventvisor::{Diagnostic, Observe};
use tokio::sync::mpsc;

/// Polls `cond` every millisecond for up to one (virtual or real) second.
pub async fn eventually(cond: impl Fn() -> bool) -> bool {
    for _ in 0..1000 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    cond()
}

/// Shared append-only log.
#[derive(Clone, Default)]
pub struct Log<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> Log<T> {
    pub fn push(&self, v: T) {
        self.0.lock().unwrap().push(v);
    }

    pub fn items(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Observer that forwards every diagnostic to a channel.
pub struct Collector {
    tx: mpsc::UnboundedSender<Diagnostic>,
}

impl Collector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Diagnostic>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Observe for Collector {
    async fn on_diagnostic(&self, d: &Diagnostic) {
        let _ = self.tx.send(d.clone());
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Receives the next diagnostic, or `None` after one second.
pub async fn next(rx: &mut mpsc::UnboundedReceiver<Diagnostic>) -> Option<Diagnostic> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()
        .flatten()
}

//! # Example: diagnostics
//!
//! Shows how contained failures are surfaced through observers.
//!
//! Demonstrates how to:
//! - Install the built-in [`LogWriter`] (feature `logging`) behind a `tracing` subscriber.
//! - Write a custom [`Observe`] implementation that counts failures.
//! - Shut the emitter down so queued diagnostics are flushed.
//!
//! ## Flow
//! ```text
//! emit("job", n)
//!   ├─► n odd  → Err(..)   → CallbackFailed   ─► LogWriter (warn) + Counter
//!   ├─► n = 4  → panic!    → CallbackPanicked ─► LogWriter (error) + Counter
//!   └─► else   → Ok(())    (silent)
//! shutdown() → drain observer queues
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example diagnostics
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eventvisor::{
    CallbackError, Diagnostic, DiagnosticKind, Emitter, EmitterConfig, LogWriter, Observe,
};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Counter {
    failures: AtomicUsize,
}

#[async_trait]
impl Observe for Counter {
    async fn on_diagnostic(&self, d: &Diagnostic) {
        if matches!(
            d.kind,
            DiagnosticKind::CallbackFailed | DiagnosticKind::CallbackPanicked
        ) {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. tracing subscriber for both the core's debug logs and LogWriter output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Emitter with two observers
    let counter = Arc::new(Counter::default());
    let bus: Emitter<u32> = Emitter::builder(EmitterConfig::named("jobs"))
        .with_observer(Arc::new(LogWriter::new()))
        .with_observer(counter.clone())
        .build();

    // 3. A subscriber that sometimes fails and once panics
    bus.on("job", |n: u32| async move {
        if n == 4 {
            panic!("job {n} exploded");
        }
        if n % 2 == 1 {
            return Err(CallbackError::fail(format!("job {n} rejected")));
        }
        Ok(())
    });

    for n in 0..6 {
        bus.emit("job", n);
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    // 4. Flush observers
    bus.shutdown().await;
    println!("failures observed: {}", counter.failures.load(Ordering::Relaxed));
}

//! # Example: expiring_listener
//!
//! Waiting for an answer with a deadline, and a slow handler guarded against overlap.
//!
//! Demonstrates how to:
//! - Configure [`Expiration`] with an `on_expire` handler.
//! - Combine it with a one-shot so the listener goes away either way.
//! - Use `only_one_instance` to drop triggers while a run is in flight.
//!
//! ## Flow
//! ```text
//! subscribe("reply", once + expire 200ms)   ── never answered ──► on_expire()
//! subscribe("reply.fast", once + expire 200ms) ── answered at 50ms ──► runs, no expiry
//! subscribe("sync", only_one_instance)
//!     ├─► emit  → run starts (300ms)
//!     ├─► emit  → dropped
//!     └─► emit after completion → runs again
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example expiring_listener
//! ```

use std::time::Duration;

use eventvisor::{Emitter, Expiration, SubscribeOptions};
use tokio::time::sleep;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus: Emitter<u32> = Emitter::named("rpc");

    // 1. Nobody answers: the handler fires and the listener is removed
    let slow = bus.subscribe(
        "reply",
        |code| async move {
            println!("[reply] got {code}");
            Ok(())
        },
        SubscribeOptions::once().expire_after(Expiration::after_ms(200).on_expire(|| {
            println!("[reply] timed out");
        })),
    );

    // 2. Answered in time: the timer is disarmed by the trigger
    let fast = bus.subscribe(
        "reply.fast",
        |code| async move {
            println!("[reply.fast] got {code}");
            Ok(())
        },
        SubscribeOptions::once().expire_after(Expiration::after_ms(200).on_expire(|| {
            println!("[reply.fast] timed out (unexpected)");
        })),
    );

    sleep(Duration::from_millis(50)).await;
    bus.emit("reply.fast", 200);

    sleep(Duration::from_millis(250)).await;
    println!("reply active: {}, reply.fast active: {}", slow.is_active(), fast.is_active());

    // 3. Single instance: overlapping triggers are dropped
    bus.subscribe(
        "sync",
        |round| async move {
            println!("[sync] round {round} started");
            sleep(Duration::from_millis(300)).await;
            println!("[sync] round {round} done");
            Ok(())
        },
        SubscribeOptions::new().only_one_instance(true),
    );

    bus.emit("sync", 1);
    sleep(Duration::from_millis(100)).await;
    bus.emit("sync", 2); // dropped
    sleep(Duration::from_millis(300)).await;
    bus.emit("sync", 3);
    sleep(Duration::from_millis(350)).await;
}

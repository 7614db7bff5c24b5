//! # Example: basic_once
//!
//! Minimal example of persistent and one-shot subscribers on a single event.
//!
//! Demonstrates how to:
//! - Subscribe closures with [`Emitter::on`] and [`Emitter::once`].
//! - Emit an event several times and watch the one-shot disappear.
//! - Remove a subscriber through its [`SubscriptionHandle`](eventvisor::SubscriptionHandle).
//!
//! ## Flow
//! ```text
//! on("greet") + once("greet")
//!     ├─► emit("greet", "alice")   → both run, the one-shot detaches
//!     ├─► emit("greet", "bob")     → persistent only
//!     ├─► handle.remove()          → event dropped
//!     └─► emit("greet", "carol")   → no-op
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_once
//! ```

use std::time::Duration;

use eventvisor::Emitter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. One isolated bus with String arguments
    let bus: Emitter<String> = Emitter::named("greeter");

    // 2. Persistent subscriber
    let every = bus.on("greet", |who: String| async move {
        println!("[every] hello, {who}");
        Ok(())
    });

    // 3. One-shot subscriber
    bus.once("greet", |who: String| async move {
        println!("[first] welcome, {who} (only once)");
        Ok(())
    });
    println!("listeners: {}", bus.listener_count("greet"));

    // 4. Emit; let spawned callbacks finish between emissions
    for who in ["alice", "bob"] {
        bus.emit("greet", who.to_string());
        tokio::time::sleep(Duration::from_millis(10)).await;
        println!("listeners: {}", bus.listener_count("greet"));
    }

    // 5. Manual removal drops the event
    every.remove();
    println!("has greet: {}", bus.has_event("greet"));
    bus.emit("greet", "carol".to_string());
}

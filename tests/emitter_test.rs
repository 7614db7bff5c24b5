//! Behavioural tests for the emitter: ordering, guards, expiration, removal.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use common::{Log, eventually};
use eventvisor::{
    CallbackError, Emitter, Expiration, ExecutionState, SubscribeOptions, SubscriptionHandle,
};
use tokio::time::{Instant, sleep};

// ---------------------------------------------------------------------------
// Registration order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fan_out_follows_registration_order() {
    let bus: Emitter<u32> = Emitter::named("order");
    let log = Log::default();

    for i in 0..5 {
        let log = log.clone();
        bus.on("tick", move |n: u32| {
            log.push((i, n));
            async { Ok(()) }
        });
    }

    bus.emit("tick", 7);
    assert_eq!(
        log.items(),
        vec![(0, 7), (1, 7), (2, 7), (3, 7), (4, 7)]
    );
}

#[tokio::test]
async fn async_bodies_start_in_registration_order() {
    let bus: Emitter<()> = Emitter::new();
    let log = Log::default();

    for i in 0..4 {
        let log = log.clone();
        bus.on("go", move |_| {
            let log = log.clone();
            async move {
                log.push(i);
                Ok(())
            }
        });
    }

    bus.emit("go", ());
    assert!(eventually(|| log.len() == 4).await);
    assert_eq!(log.items(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn self_removal_during_fan_out_does_not_skip_siblings() {
    let bus: Emitter<()> = Emitter::new();
    let log = Log::default();
    let slots: Vec<Arc<OnceLock<SubscriptionHandle>>> =
        (0..4).map(|_| Arc::new(OnceLock::new())).collect();

    for (i, slot) in slots.iter().enumerate() {
        let log = log.clone();
        let me = Arc::clone(slot);
        let handle = bus.on("e", move |_| {
            log.push(i);
            // Every even subscriber unsubscribes itself while fan-out is in progress.
            if i % 2 == 0 {
                if let Some(h) = me.get() {
                    h.remove();
                }
            }
            async { Ok(()) }
        });
        slot.set(handle).unwrap();
    }

    bus.emit("e", ());
    assert_eq!(log.items(), vec![0, 1, 2, 3]);
    assert_eq!(bus.listener_count("e"), 2);

    bus.emit("e", ());
    assert_eq!(log.items(), vec![0, 1, 2, 3, 1, 3]);
}

#[tokio::test]
async fn one_shots_mixed_with_persistent_keep_order() {
    let bus: Emitter<u8> = Emitter::new();
    let log = Log::default();

    for i in 0..4 {
        let log = log.clone();
        let cb = move |_: u8| {
            log.push(i);
            async { Ok(()) }
        };
        if i % 2 == 0 {
            bus.once("e", cb);
        } else {
            bus.on("e", cb);
        }
    }

    bus.emit("e", 0);
    assert_eq!(log.items(), vec![0, 1, 2, 3]);
    assert!(eventually(|| bus.listener_count("e") == 2).await);

    bus.emit("e", 0);
    assert_eq!(log.items(), vec![0, 1, 2, 3, 1, 3]);
}

#[tokio::test]
async fn removed_sibling_is_not_triggered_by_the_same_emit() {
    let bus: Emitter<()> = Emitter::new();
    let log = Log::default();
    let victim: Arc<OnceLock<SubscriptionHandle>> = Arc::new(OnceLock::new());

    {
        let log = log.clone();
        let victim = Arc::clone(&victim);
        bus.on("e", move |_| {
            log.push("killer");
            if let Some(h) = victim.get() {
                h.remove();
            }
            async { Ok(()) }
        });
    }
    {
        let log = log.clone();
        let h = bus.on("e", move |_| {
            log.push("victim");
            async { Ok(()) }
        });
        victim.set(h).unwrap();
    }

    bus.emit("e", ());
    assert_eq!(log.items(), vec!["killer"]);
    assert_eq!(bus.listener_count("e"), 1);
}

// ---------------------------------------------------------------------------
// Single instance guard
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn single_instance_drops_triggers_while_running() {
    let bus: Emitter<()> = Emitter::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let h = bus.subscribe(
        "slow",
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                sleep(Duration::from_millis(100)).await;
                Ok(())
            }
        },
        SubscribeOptions::new().only_one_instance(true),
    );

    bus.emit("slow", ());
    assert_eq!(bus.execution_state("slow", h.execution_id()), Some(ExecutionState::Running));

    sleep(Duration::from_millis(10)).await;
    bus.emit("slow", ());
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(150)).await;
    assert_eq!(bus.execution_state("slow", h.execution_id()), Some(ExecutionState::Idle));

    bus.emit("slow", ());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn without_guard_runs_overlap() {
    let bus: Emitter<()> = Emitter::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let h = bus.on("slow", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {
            sleep(Duration::from_millis(100)).await;
            Ok(())
        }
    });

    bus.emit("slow", ());
    bus.emit("slow", ());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    let snap = bus.executions("slow");
    assert_eq!(snap[0].id, h.execution_id());
    assert_eq!(snap[0].in_flight, 2);
}

#[tokio::test(start_paused = true)]
async fn failed_run_frees_the_single_instance_slot() {
    let bus: Emitter<()> = Emitter::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    bus.subscribe(
        "flaky",
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                sleep(Duration::from_millis(5)).await;
                Err(CallbackError::fail("boom"))
            }
        },
        SubscribeOptions::new().only_one_instance(true),
    );

    bus.emit("flaky", ());
    sleep(Duration::from_millis(20)).await;
    bus.emit("flaky", ());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// One-shot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_shot_is_removed_after_its_first_run() {
    let bus: Emitter<&'static str> = Emitter::new();
    let log = Log::default();

    let l = log.clone();
    let h = bus.once("ready", move |v| {
        l.push(v);
        async { Ok(()) }
    });
    assert!(bus.has_event("ready"));
    assert!(h.is_active());

    bus.emit("ready", "first");
    assert!(eventually(|| !h.is_active()).await);
    assert!(!bus.has_event("ready"));

    bus.emit("ready", "second");
    assert_eq!(log.items(), vec!["first"]);
}

#[tokio::test(start_paused = true)]
async fn one_shot_runs_at_most_once_even_if_triggered_twice_while_running() {
    let bus: Emitter<()> = Emitter::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let h = bus.once("slow", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {
            sleep(Duration::from_millis(50)).await;
            Ok(())
        }
    });

    bus.emit("slow", ());
    bus.emit("slow", ());
    // Still registered while the single run is in flight.
    assert!(h.is_active());

    sleep(Duration::from_millis(60)).await;
    assert!(!h.is_active());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_one_shot_is_still_removed() {
    let bus: Emitter<()> = Emitter::new();
    let h = bus.once("e", |_| async { Err(CallbackError::fail("nope")) });

    bus.emit("e", ());
    assert!(eventually(|| !h.is_active()).await);
    assert!(!bus.has_event("e"));
}

#[tokio::test]
async fn panicking_one_shot_is_still_removed() {
    let bus: Emitter<()> = Emitter::new();
    let h = bus.once("e", |_| async { panic!("kaboom") });

    bus.emit("e", ());
    assert!(eventually(|| !h.is_active()).await);
}

// ---------------------------------------------------------------------------
// Expiration
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn trigger_before_expiry_disarms_the_timer() {
    let bus: Emitter<()> = Emitter::new();
    let expired = Arc::new(AtomicUsize::new(0));
    let runs = Arc::new(AtomicUsize::new(0));

    let (e, r) = (Arc::clone(&expired), Arc::clone(&runs));
    let h = bus.subscribe(
        "answer",
        move |_| {
            r.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        },
        SubscribeOptions::new().expire_after(Expiration::after_ms(50).on_expire(move || {
            e.fetch_add(1, Ordering::SeqCst);
        })),
    );
    assert_eq!(bus.execution_state("answer", h.execution_id()), Some(ExecutionState::Armed));

    sleep(Duration::from_millis(10)).await;
    bus.emit("answer", ());

    sleep(Duration::from_millis(100)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(expired.load(Ordering::SeqCst), 0);
    assert!(h.is_active());
    assert_eq!(bus.execution_state("answer", h.execution_id()), Some(ExecutionState::Idle));
}

#[tokio::test(start_paused = true)]
async fn untriggered_execution_expires_exactly_once() {
    let bus: Emitter<()> = Emitter::new();
    let fired_at: Arc<Mutex<Vec<Instant>>> = Arc::default();
    let start = Instant::now();

    let f = Arc::clone(&fired_at);
    let h = bus.subscribe(
        "answer",
        |_| async { Ok(()) },
        SubscribeOptions::new().expire_after(Expiration::after_ms(50).on_expire(move || {
            f.lock().unwrap().push(Instant::now());
        })),
    );

    sleep(Duration::from_millis(200)).await;

    let fired = fired_at.lock().unwrap().clone();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].duration_since(start) >= Duration::from_millis(50));
    assert!(!h.is_active());
    assert!(!bus.has_event("answer"));
}

#[tokio::test(start_paused = true)]
async fn expiry_removes_only_the_expiring_execution() {
    let bus: Emitter<()> = Emitter::new();
    let keep = bus.on("e", |_| async { Ok(()) });
    let expiring = bus.subscribe(
        "e",
        |_| async { Ok(()) },
        SubscribeOptions::new().expire_after(Expiration::after_ms(20)),
    );

    sleep(Duration::from_millis(30)).await;
    assert!(keep.is_active());
    assert!(!expiring.is_active());
    assert_eq!(bus.listener_count("e"), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_never_expires() {
    let bus: Emitter<()> = Emitter::new();
    let expired = Arc::new(AtomicUsize::new(0));

    let e = Arc::clone(&expired);
    let h = bus.subscribe(
        "e",
        |_| async { Ok(()) },
        SubscribeOptions::new().expire_after(Expiration::after(Duration::ZERO).on_expire(move || {
            e.fetch_add(1, Ordering::SeqCst);
        })),
    );

    assert_eq!(bus.execution_state("e", h.execution_id()), Some(ExecutionState::Idle));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(expired.load(Ordering::SeqCst), 0);
    assert!(h.is_active());
}

#[tokio::test(start_paused = true)]
async fn one_shot_with_expiry_triggered_in_time() {
    let bus: Emitter<()> = Emitter::new();
    let expired = Arc::new(AtomicUsize::new(0));

    let e = Arc::clone(&expired);
    let h = bus.subscribe(
        "e",
        |_| async { Ok(()) },
        SubscribeOptions::once().expire_after(Expiration::after_ms(50).on_expire(move || {
            e.fetch_add(1, Ordering::SeqCst);
        })),
    );

    bus.emit("e", ());
    sleep(Duration::from_millis(100)).await;
    assert!(!h.is_active());
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Manual cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn remove_is_idempotent_and_disarms_expiry() {
    let bus: Emitter<()> = Emitter::new();
    let expired = Arc::new(AtomicUsize::new(0));

    let e = Arc::clone(&expired);
    let h = bus.subscribe(
        "e",
        |_| async { Ok(()) },
        SubscribeOptions::new().expire_after(Expiration::after_ms(50).on_expire(move || {
            e.fetch_add(1, Ordering::SeqCst);
        })),
    );

    h.remove();
    h.remove();
    assert!(!h.is_active());
    assert!(!bus.has_event("e"));

    sleep(Duration::from_millis(100)).await;
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn remove_does_not_interrupt_an_in_flight_run() {
    let bus: Emitter<()> = Emitter::new();
    let finished = Arc::new(AtomicUsize::new(0));

    let f = Arc::clone(&finished);
    let h = bus.on("e", move |_| {
        let f = Arc::clone(&f);
        async move {
            sleep(Duration::from_millis(50)).await;
            f.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    bus.emit("e", ());
    h.remove();
    assert!(!bus.has_event("e"));

    sleep(Duration::from_millis(100)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1);

    bus.emit("e", ());
    sleep(Duration::from_millis(100)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn unsubscribe_event_cancels_every_timer() {
    let bus: Emitter<()> = Emitter::new();
    let expired = Arc::new(AtomicUsize::new(0));

    let handles: Vec<SubscriptionHandle> = (0..3)
        .map(|_| {
            let e = Arc::clone(&expired);
            bus.subscribe(
                "e",
                |_| async { Ok(()) },
                SubscribeOptions::new().expire_after(Expiration::after_ms(30).on_expire(move || {
                    e.fetch_add(1, Ordering::SeqCst);
                })),
            )
        })
        .collect();

    bus.unsubscribe_event("e");
    assert!(handles.iter().all(|h| !h.is_active()));

    sleep(Duration::from_millis(60)).await;
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn clear_cancels_every_timer() {
    let bus: Emitter<()> = Emitter::new();
    let expired = Arc::new(AtomicUsize::new(0));

    for name in ["a", "b"] {
        let e = Arc::clone(&expired);
        bus.subscribe(
            name,
            |_| async { Ok(()) },
            SubscribeOptions::new().expire_after(Expiration::after_ms(30).on_expire(move || {
                e.fetch_add(1, Ordering::SeqCst);
            })),
        );
    }

    bus.clear();
    sleep(Duration::from_millis(60)).await;
    assert_eq!(expired.load(Ordering::SeqCst), 0);
    assert!(bus.event_names().is_empty());
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_subscribers_do_not_affect_siblings() {
    let bus: Emitter<()> = Emitter::new();
    let reached = Arc::new(AtomicUsize::new(0));

    bus.on("e", |_| async { Err(CallbackError::fail("first fails")) });
    bus.on("e", |_| async { panic!("second panics") });
    bus.on("e", |_| -> std::future::Ready<Result<(), CallbackError>> {
        panic!("third panics before returning a future")
    });

    let r = Arc::clone(&reached);
    bus.on("e", move |_| {
        r.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    });

    bus.emit("e", ());
    bus.emit("e", ());
    assert_eq!(reached.load(Ordering::SeqCst), 2);

    // Failures leave the subscribers registered and usable.
    sleep(Duration::from_millis(10)).await;
    assert_eq!(bus.listener_count("e"), 4);
    assert!(bus.executions("e").iter().all(|s| s.has_executed));
}

// ---------------------------------------------------------------------------
// Emit to nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn emitting_to_nobody_is_a_no_op() {
    let bus: Emitter<u32> = Emitter::new();
    bus.emit("never-registered", 1);

    let h = bus.on("gone", |_| async { Ok(()) });
    h.remove();
    bus.emit("gone", 2);

    assert!(bus.event_names().is_empty());
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn execution_ids_are_never_reused_under_churn() {
    let bus: Emitter<()> = Emitter::new();
    let mut ids = HashSet::new();
    let mut event_ids = Vec::new();

    for _ in 0..25 {
        let h = bus.on("churn", |_| async { Ok(()) });
        event_ids.push(bus.event_id("churn").unwrap());
        ids.insert(h.execution_id());
        h.remove();
        assert!(!bus.has_event("churn"));
    }

    assert_eq!(ids.len(), 25);
    assert!(event_ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn ids_are_scoped_to_each_emitter() {
    let a: Emitter<()> = Emitter::named("a");
    let b: Emitter<()> = Emitter::named("b");

    let ha = a.on("x", |_| async { Ok(()) });
    let hb = b.on("x", |_| async { Ok(()) });
    assert_eq!(ha.execution_id(), hb.execution_id());

    // The same id on another bus names a different execution.
    a.unsubscribe_execution("x", hb.execution_id());
    assert!(!ha.is_active());
    assert!(hb.is_active());
}

// ---------------------------------------------------------------------------
// Re-entrancy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callbacks_may_reenter_the_emitter() {
    let bus: Emitter<u32> = Emitter::new();
    let log = Log::default();

    let inner = bus.clone();
    let l = log.clone();
    bus.on("outer", move |n| {
        l.push(format!("outer {n}"));
        let l2 = l.clone();
        inner.once("late", move |m| {
            l2.push(format!("late {m}"));
            async { Ok(()) }
        });
        inner.emit("inner", n + 1);
        async { Ok(()) }
    });

    let l = log.clone();
    bus.on("inner", move |n| {
        l.push(format!("inner {n}"));
        async { Ok(()) }
    });

    bus.emit("outer", 1);
    bus.emit("late", 9);
    assert_eq!(log.items(), vec!["outer 1", "inner 2", "late 9"]);
}

//! # Emitter: the named-event registry.
//!
//! [`Emitter`] owns every event of one bus and is the only entry point client code
//! touches. Each instance keeps its own map; there is no process-wide table, so any
//! number of isolated buses can coexist.
//!
//! ## Architecture
//! ```text
//! Emitter (Arc<Shared>)
//!   └─► Mutex<RegistryState>
//!         ├─► events: HashMap<name, Event>
//!         │            └─► executions: [Execution, ...]   (registration order)
//!         ├─► next_event_id       (monotonic, never reused)
//!         └─► next_execution_id   (monotonic across the whole emitter, never reused)
//!
//! Execution ──Weak──► Shared   (detach on one-shot completion / expiration)
//! SubscriptionHandle ──Weak──► Shared   (detach on remove())
//! ```
//!
//! ## Rules
//! - At most one event per name; an event with no executions is removed immediately.
//! - The registry lock is never held while a callback runs.
//! - Locks are only ever taken in the order registry → execution, never the reverse.
//! - `emit` to an unknown name is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::callbacks::{CallbackFn, CallbackRef};
use crate::core::builder::EmitterBuilder;
use crate::core::event::{Event, fan_out};
use crate::core::execution::{Execution, ExecutionContext, ExecutionSnapshot, ExecutionState};
use crate::core::{Detach, EmitterConfig, EventId, ExecutionId, lock};
use crate::diagnostics::ObserverSet;
use crate::error::CallbackError;
use crate::subscription::{SubscribeOptions, SubscriptionHandle};

struct RegistryState<A> {
    events: HashMap<Arc<str>, Event<A>>,
    next_event_id: EventId,
    next_execution_id: ExecutionId,
}

pub(crate) struct Shared<A> {
    name: Arc<str>,
    defaults: SubscribeOptions,
    observers: Arc<ObserverSet>,
    state: Mutex<RegistryState<A>>,
}

impl<A> Shared<A> {
    /// Detaches one execution; drops its event if it was the last one.
    fn remove_execution(&self, event: &str, id: ExecutionId) -> bool {
        let (removed, dropped_event) = {
            let mut state = lock(&self.state);
            let Some(bucket) = state.events.get_mut(event) else {
                return false;
            };
            let removed = bucket.remove(id);
            let dropped_event = if bucket.is_empty() {
                state.events.remove(event).map(|e| e.id())
            } else {
                None
            };
            (removed, dropped_event)
        };

        if let Some(event_id) = dropped_event {
            debug!(emitter = %self.name, event, event_id, "event removed");
        }
        match removed {
            Some(exec) => {
                exec.cancel();
                debug!(emitter = %self.name, event, execution = id, "unsubscribed");
                true
            }
            None => false,
        }
    }
}

impl<A: Send + 'static> Detach for Shared<A> {
    fn detach(&self, event: &str, execution: ExecutionId) -> bool {
        self.remove_execution(event, execution)
    }

    fn is_attached(&self, event: &str, execution: ExecutionId) -> bool {
        lock(&self.state)
            .events
            .get(event)
            .is_some_and(|e| e.contains(execution))
    }
}

impl<A> Drop for Shared<A> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for bucket in state.events.values_mut() {
            for exec in bucket.take_all() {
                exec.cancel();
            }
        }
    }
}

/// Named-event registry.
///
/// Cheap to clone; clones share the same events.
///
/// ### Runtime requirements
/// `emit` spawns each started callback onto the current Tokio runtime, and `subscribe`
/// with an expiration spawns its timer there. Outside a runtime neither panics: `emit`
/// is skipped (nothing is triggered) and the expiration is not armed. Both cases are
/// logged at `debug`. Plain subscriptions, removals and introspection work anywhere.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use eventvisor::{Emitter, Expiration, SubscribeOptions};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let bus: Emitter<String> = Emitter::named("bus");
///
///     let handle = bus.on("greet", |who: String| async move {
///         println!("hello, {who}");
///         Ok(())
///     });
///
///     bus.subscribe(
///         "greet",
///         |_who: String| async { Ok(()) },
///         SubscribeOptions::once().expire_after(Expiration::after(Duration::from_secs(1))),
///     );
///
///     bus.emit("greet", "world".to_string());
///     handle.remove();
///     assert_eq!(bus.listener_count("greet"), 1);
/// }
/// ```
pub struct Emitter<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for Emitter<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Clone + Send + 'static> Default for Emitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Emitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = lock(&self.shared.state).events.len();
        f.debug_struct("Emitter")
            .field("name", &self.shared.name)
            .field("events", &events)
            .field("observers", &self.shared.observers.len())
            .finish()
    }
}

impl<A: Clone + Send + 'static> Emitter<A> {
    /// Creates an emitter with a generated name and no observers.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Creates an emitter with the given name and no observers.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_config(EmitterConfig::named(name))
    }

    /// Creates an emitter from a config, with no observers.
    pub fn with_config(cfg: EmitterConfig) -> Self {
        Self::new_internal(cfg, ObserverSet::empty())
    }

    /// Starts a builder (to attach observers).
    pub fn builder(cfg: EmitterConfig) -> EmitterBuilder<A> {
        EmitterBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: EmitterConfig, observers: Arc<ObserverSet>) -> Self {
        let name: Arc<str> = Arc::from(cfg.resolved_name());
        debug!(emitter = %name, observers = observers.len(), "emitter created");
        Self {
            shared: Arc::new(Shared {
                name,
                defaults: cfg.default_options,
                observers,
                state: Mutex::new(RegistryState {
                    events: HashMap::new(),
                    next_event_id: 1,
                    next_execution_id: 1,
                }),
            }),
        }
    }

    /// Emitter name (as used in logs and diagnostics).
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Subscribes a closure to `event` with explicit options.
    ///
    /// The event is created if it does not exist yet.
    ///
    /// If `options` configure an expiration, the timer is spawned on the current Tokio
    /// runtime; without one the execution is registered unarmed.
    pub fn subscribe<F, Fut>(&self, event: &str, f: F, options: SubscribeOptions) -> SubscriptionHandle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.subscribe_callback(event, CallbackFn::arc(f), options)
    }

    /// Subscribes a shared callback to `event` with explicit options.
    pub fn subscribe_callback(
        &self,
        event: &str,
        callback: CallbackRef<A>,
        options: SubscribeOptions,
    ) -> SubscriptionHandle {
        let weak: Weak<Shared<A>> = Arc::downgrade(&self.shared);
        let registry: Weak<dyn Detach> = weak;
        let ctx = ExecutionContext {
            emitter: Arc::clone(&self.shared.name),
            registry: registry.clone(),
            observers: Arc::clone(&self.shared.observers),
        };

        let (name, execution) = {
            let mut state = lock(&self.shared.state);
            let RegistryState {
                events,
                next_event_id,
                next_execution_id,
            } = &mut *state;

            let id = *next_execution_id;
            *next_execution_id += 1;

            let bucket = events.entry(Arc::from(event)).or_insert_with_key(|name| {
                let event_id = *next_event_id;
                *next_event_id += 1;
                debug!(emitter = %self.shared.name, event = %name, event_id, "event created");
                Event::new(Arc::clone(name), event_id)
            });

            let name = Arc::clone(bucket.name());
            let execution = Execution::new(id, Arc::clone(&name), callback, &options, ctx);
            bucket.push(Arc::clone(&execution));
            (name, execution)
        };

        execution.arm();
        debug!(
            emitter = %self.shared.name,
            event,
            execution = execution.id(),
            once = options.remove_after_execute,
            only_one = options.only_one_instance,
            expire_after = ?options.expiration_timeout(),
            "subscribed"
        );
        SubscriptionHandle::new(name, execution.id(), registry)
    }

    /// Subscribes with the emitter's default options.
    pub fn on<F, Fut>(&self, event: &str, f: F) -> SubscriptionHandle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.subscribe(event, f, self.shared.defaults.clone())
    }

    /// Subscribes a one-shot with the emitter's default options.
    pub fn once<F, Fut>(&self, event: &str, f: F) -> SubscriptionHandle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        let options = self.shared.defaults.clone().remove_after_execute(true);
        self.subscribe(event, f, options)
    }

    /// Triggers every execution of `event` in registration order.
    ///
    /// Returns once every execution has been offered the trigger; it does not wait for
    /// callbacks to finish. Callback failures never surface here.
    ///
    /// Started callbacks are spawned on the current Tokio runtime. Called outside a
    /// runtime, the emission is skipped.
    pub fn emit(&self, event: &str, args: A) {
        let snapshot = match lock(&self.shared.state).events.get(event) {
            Some(bucket) => bucket.snapshot(),
            None => return,
        };
        if Handle::try_current().is_err() {
            debug!(emitter = %self.shared.name, event, "emit outside a tokio runtime skipped");
            return;
        }

        let out = fan_out(&snapshot, args);
        trace!(
            emitter = %self.shared.name,
            event,
            started = out.started,
            dropped = out.dropped,
            skipped = out.skipped,
            "emitted"
        );
    }

    /// Removes `event` and all of its executions, disarming their timers.
    pub fn unsubscribe_event(&self, event: &str) {
        let removed = lock(&self.shared.state).events.remove(event);
        if let Some(mut bucket) = removed {
            let executions = bucket.take_all();
            for exec in &executions {
                exec.cancel();
            }
            debug!(
                emitter = %self.shared.name,
                event,
                event_id = bucket.id(),
                executions = executions.len(),
                "event removed"
            );
        }
    }

    /// Removes one execution; the event goes too if it was the last one.
    ///
    /// Unknown names or ids are ignored.
    pub fn unsubscribe_execution(&self, event: &str, execution: ExecutionId) {
        self.shared.remove_execution(event, execution);
    }

    /// Removes every event.
    pub fn clear(&self) {
        let events = std::mem::take(&mut lock(&self.shared.state).events);
        let count = events.len();
        for (_, mut bucket) in events {
            for exec in bucket.take_all() {
                exec.cancel();
            }
        }
        debug!(emitter = %self.shared.name, events = count, "cleared");
    }

    /// Sorted list of event names that currently have executions.
    pub fn event_names(&self) -> Vec<String> {
        let state = lock(&self.shared.state);
        let mut names: Vec<String> = state.events.keys().map(|k| k.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// True if `event` currently has at least one execution.
    pub fn has_event(&self, event: &str) -> bool {
        lock(&self.shared.state).events.contains_key(event)
    }

    /// Number of executions registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.shared.state)
            .events
            .get(event)
            .map_or(0, |e| e.len())
    }

    /// Creation-order id of the current event object for `event`.
    pub fn event_id(&self, event: &str) -> Option<EventId> {
        lock(&self.shared.state).events.get(event).map(|e| e.id())
    }

    /// Snapshots of the executions of `event`, in registration order.
    pub fn executions(&self, event: &str) -> Vec<ExecutionSnapshot> {
        lock(&self.shared.state)
            .events
            .get(event)
            .map(|e| e.describe())
            .unwrap_or_default()
    }

    /// State of one execution, `None` once it is no longer registered.
    pub fn execution_state(&self, event: &str, execution: ExecutionId) -> Option<ExecutionState> {
        self.executions(event)
            .into_iter()
            .find(|s| s.id == execution)
            .map(|s| s.state)
    }

    /// Removes every event, then closes the observer queues and waits for them to drain.
    pub async fn shutdown(&self) {
        self.clear();
        self.shared.observers.shutdown().await;
    }
}

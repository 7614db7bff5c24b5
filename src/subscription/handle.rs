//! # Subscription handle.
//!
//! Returned by every `subscribe` call. Holds a non-owning reference to the emitter,
//! so keeping a handle around never keeps an emitter alive, and dropping a handle
//! never unsubscribes.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::core::{Detach, ExecutionId};

/// Cancellation handle for one execution.
#[derive(Clone)]
pub struct SubscriptionHandle {
    event: Arc<str>,
    execution: ExecutionId,
    registry: Weak<dyn Detach>,
}

impl SubscriptionHandle {
    pub(crate) fn new(event: Arc<str>, execution: ExecutionId, registry: Weak<dyn Detach>) -> Self {
        Self {
            event,
            execution,
            registry,
        }
    }

    /// Removes the execution from its event.
    ///
    /// Idempotent: removing twice (or after the execution expired or completed as a
    /// one-shot) is a no-op. Disarms any pending expiration timer. A run already in
    /// flight is not interrupted.
    pub fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(&self.event, self.execution);
        }
    }

    /// True while the execution is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.is_attached(&self.event, self.execution))
    }

    /// Name of the event this handle subscribes to.
    pub fn event_name(&self) -> &str {
        &self.event
    }

    /// Id of the execution, unique within its emitter.
    pub fn execution_id(&self) -> ExecutionId {
        self.execution
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("event", &self.event)
            .field("execution", &self.execution)
            .finish()
    }
}

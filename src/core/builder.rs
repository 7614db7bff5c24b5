use std::marker::PhantomData;
use std::sync::Arc;

use crate::{
    core::{Emitter, EmitterConfig},
    diagnostics::{Observe, ObserverSet},
};

/// Builder for constructing an [`Emitter`] with observers.
pub struct EmitterBuilder<A> {
    cfg: EmitterConfig,
    observers: Vec<Arc<dyn Observe>>,
    _args: PhantomData<fn(A)>,
}

impl<A: Clone + Send + 'static> EmitterBuilder<A> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EmitterConfig) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            _args: PhantomData,
        }
    }

    /// Sets the emitter name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.cfg.name = Some(name.into());
        self
    }

    /// Sets diagnostic observers.
    ///
    /// Observers receive contained callback failures, dropped triggers and expirations
    /// through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Adds one diagnostic observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Builds the emitter.
    ///
    /// # Panics
    /// Observer workers are spawned here, so a Tokio runtime is required when at least
    /// one observer is configured.
    pub fn build(self) -> Emitter<A> {
        let observers = if self.observers.is_empty() {
            ObserverSet::empty()
        } else {
            ObserverSet::new(self.observers)
        };
        Emitter::new_internal(self.cfg, observers)
    }
}

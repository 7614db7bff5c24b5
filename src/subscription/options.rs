//! # Per-subscription lifecycle options.
//!
//! [`SubscribeOptions`] bundles the guards attached to one execution:
//! - **one-shot** (`remove_after_execute`): run at most once, then remove itself
//! - **expiration** ([`Expiration`]): remove itself if never triggered in time
//! - **single instance** (`only_one_instance`): drop triggers while a run is in flight
//!
//! All fields are optional and independently combinable.
//!
//! ## Sentinel values
//! - `Expiration` with `timeout = 0s` → no expiration (the guard is never armed)
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{Expiration, SubscribeOptions};
//!
//! let opts = SubscribeOptions::new()
//!     .remove_after_execute(true)
//!     .expire_after(Expiration::after(Duration::from_secs(5)).on_expire(|| {
//!         eprintln!("nobody answered");
//!     }));
//!
//! assert!(opts.remove_after_execute);
//! assert!(!opts.only_one_instance);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Handler invoked when an execution expires untriggered.
pub type ExpireFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// Time-based expiration guard.
#[derive(Clone)]
pub struct Expiration {
    timeout: Duration,
    on_expire: Option<ExpireFn>,
}

impl Expiration {
    /// Expire `timeout` after registration unless triggered first.
    pub fn after(timeout: Duration) -> Self {
        Self {
            timeout,
            on_expire: None,
        }
    }

    /// Shorthand for [`Expiration::after`] in milliseconds.
    pub fn after_ms(ms: u64) -> Self {
        Self::after(Duration::from_millis(ms))
    }

    /// Sets the handler invoked when the timer fires.
    pub fn on_expire<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_expire = Some(Arc::new(f));
        self
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the timeout as an `Option`.
    ///
    /// - `None` → zero timeout, the guard is not armed
    /// - `Some(d)` → timer armed for `d`
    #[inline]
    pub fn effective_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    pub(crate) fn handler(&self) -> Option<ExpireFn> {
        self.on_expire.clone()
    }
}

impl fmt::Debug for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expiration")
            .field("timeout", &self.timeout)
            .field("on_expire", &self.on_expire.is_some())
            .finish()
    }
}

/// Lifecycle configuration for a single subscription.
///
/// ## Field semantics
/// - `remove_after_execute`: at most one run; removed as soon as it completes
/// - `expire_after`: removed (and `on_expire` invoked) if not triggered within the timeout
/// - `only_one_instance`: a trigger arriving while a run is in flight is dropped
#[derive(Clone, Debug, Default)]
pub struct SubscribeOptions {
    /// Run at most once, then remove the execution.
    pub remove_after_execute: bool,
    /// Optional expiration guard.
    pub expire_after: Option<Expiration>,
    /// Drop triggers while a previous run is still in flight.
    pub only_one_instance: bool,
}

impl SubscribeOptions {
    /// All guards disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot options (`remove_after_execute = true`).
    pub fn once() -> Self {
        Self::new().remove_after_execute(true)
    }

    pub fn remove_after_execute(mut self, on: bool) -> Self {
        self.remove_after_execute = on;
        self
    }

    pub fn expire_after(mut self, expiration: Expiration) -> Self {
        self.expire_after = Some(expiration);
        self
    }

    pub fn only_one_instance(mut self, on: bool) -> Self {
        self.only_one_instance = on;
        self
    }

    /// Expiration timeout, with the zero sentinel resolved.
    #[inline]
    pub fn expiration_timeout(&self) -> Option<Duration> {
        self.expire_after
            .as_ref()
            .and_then(Expiration::effective_timeout)
    }
}

//! # Emitter configuration.
//!
//! Provides [`EmitterConfig`], the settings of one emitter instance.
//!
//! Config is used in two ways:
//! 1. **Emitter creation**: `Emitter::builder(config)` / `Emitter::with_config(config)`
//! 2. **Subscription defaults**: `Emitter::on` / `Emitter::once` start from
//!    `default_options`
//!
//! ## Sentinel values
//! - `name = None` → a random `emitter-xxxxxxxx` name is generated

use crate::subscription::SubscribeOptions;

/// Configuration for one emitter.
///
/// ## Field semantics
/// - `name`: identifier used in logs and diagnostics (`None` = auto-generated)
/// - `default_options`: options applied by the `on`/`once` shorthands
#[derive(Clone, Debug, Default)]
pub struct EmitterConfig {
    /// Emitter name for logs and diagnostics.
    pub name: Option<String>,

    /// Options used by [`Emitter::on`](crate::Emitter::on) and, with
    /// `remove_after_execute` forced on, by [`Emitter::once`](crate::Emitter::once).
    pub default_options: SubscribeOptions,
}

impl EmitterConfig {
    /// Config with an explicit name and default options.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the configured name, or a freshly generated one.
    pub fn resolved_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("emitter-{:08x}", rand::random::<u32>()),
        }
    }
}

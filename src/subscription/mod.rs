//! # Subscription options and handles.
//!
//! - [`SubscribeOptions`] / [`Expiration`] configure an execution's lifecycle guards
//! - [`SubscriptionHandle`] cancels one execution

mod handle;
mod options;

pub use handle::SubscriptionHandle;
pub use options::{ExpireFn, Expiration, SubscribeOptions};

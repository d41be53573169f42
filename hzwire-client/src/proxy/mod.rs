//! Typed facades over the subscription manager.

mod map_events;

pub use map_events::{MapEvents, SubscriptionMode};

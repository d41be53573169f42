//! Entry event types, lazy event fields and handler sets.

use std::sync::atomic::{AtomicU64, Ordering};

mod event_type;
mod handlers;
mod lazy;

pub use event_type::EntryEventType;
pub use handlers::{
    EntryCallback, EntryEvent, EntryHandler, EntryHandlers, MapCallback, MapEvent,
};
pub use lazy::LazyValue;

/// Counters shared by every subscription of a manager.
#[derive(Debug, Default)]
pub struct ListenerStats {
    messages_received: AtomicU64,
    events_dispatched: AtomicU64,
    errors: AtomicU64,
    reinstalls: AtomicU64,
}

impl ListenerStats {
    /// Creates new listener statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the messages received counter.
    pub fn record_message(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the dispatched events counter.
    pub fn record_dispatch(&self) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the error counter.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the successful reinstall counter.
    pub fn record_reinstall(&self) {
        self.reinstalls.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of event messages received.
    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    /// Returns the number of events handed to a subscription.
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    /// Returns the number of errors encountered.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns the number of successful reinstalls.
    pub fn reinstalls(&self) -> u64 {
        self.reinstalls.load(Ordering::Relaxed)
    }
}

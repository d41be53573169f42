//! Entry event values and the handler sets they are dispatched to.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::{EntryEventType, LazyValue};
use crate::cluster::Member;

/// An entry-level event with lazily deserialized fields.
#[derive(Debug)]
pub struct EntryEvent<K, V> {
    /// Name of the map that raised the event.
    pub source: String,
    /// The member that raised the event, if the directory knows it.
    pub member: Option<Member>,
    /// The entry key.
    pub key: LazyValue<K>,
    /// The new value, when values are included.
    pub value: LazyValue<V>,
    /// The previous value, when values are included.
    pub old_value: LazyValue<V>,
    /// The value of the merging entry, for merge events.
    pub merging_value: LazyValue<V>,
    /// The event-type bits.
    pub event_type: EntryEventType,
    /// Number of entries affected by a map-wide event.
    pub number_of_affected_entries: i32,
}

impl<K, V> EntryEvent<K, V> {
    /// Returns the map-wide view of this event.
    pub fn to_map_event(&self) -> MapEvent {
        MapEvent {
            source: self.source.clone(),
            member: self.member.clone(),
            event_type: self.event_type,
            number_of_affected_entries: self.number_of_affected_entries,
        }
    }
}

/// A map-wide event such as a clear or an evict-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEvent {
    /// Name of the map that raised the event.
    pub source: String,
    /// The member that raised the event, if the directory knows it.
    pub member: Option<Member>,
    /// The event-type bits.
    pub event_type: EntryEventType,
    /// Number of entries affected.
    pub number_of_affected_entries: i32,
}

/// Callback receiving entry events.
pub type EntryCallback<K, V> =
    Arc<dyn Fn(Arc<EntryEvent<K, V>>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Callback receiving map-wide events.
pub type MapCallback = Arc<dyn Fn(MapEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// One registered handler with the event types it accepts.
pub enum EntryHandler<K, V> {
    /// Receives the full entry event.
    Entry {
        /// Event types this handler accepts.
        mask: EntryEventType,
        /// The callback.
        callback: EntryCallback<K, V>,
    },
    /// Receives only the map-wide view.
    Map {
        /// Event types this handler accepts.
        mask: EntryEventType,
        /// The callback.
        callback: MapCallback,
    },
}

impl<K, V> EntryHandler<K, V> {
    /// Returns the event types this handler accepts.
    pub fn mask(&self) -> EntryEventType {
        match self {
            Self::Entry { mask, .. } | Self::Map { mask, .. } => *mask,
        }
    }

    /// Returns `true` if the handler's mask holds every bit of `event_type`.
    pub fn accepts(&self, event_type: EntryEventType) -> bool {
        self.mask().contains(event_type)
    }
}

impl<K, V> fmt::Debug for EntryHandler<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Entry { .. } => "Entry",
            Self::Map { .. } => "Map",
        };
        f.debug_struct("EntryHandler")
            .field("kind", &kind)
            .field("mask", &self.mask())
            .finish()
    }
}

/// An ordered set of entry handlers.
///
/// Handlers run in registration order. Use the `on_*` methods to add them:
///
/// ```ignore
/// let handlers = EntryHandlers::<String, i32>::new()
///     .on_added(|event| async move {
///         println!("added {:?}", event.key.get());
///     })
///     .on_map_cleared(|event| async move {
///         println!("cleared {} entries", event.number_of_affected_entries);
///     });
/// ```
pub struct EntryHandlers<K, V> {
    handlers: Vec<EntryHandler<K, V>>,
}

impl<K, V> EntryHandlers<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates an empty handler set.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Adds an entry handler for every event type in `mask`.
    pub fn on_entry<F, Fut>(mut self, mask: EntryEventType, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.push(EntryHandler::Entry {
            mask,
            callback: Arc::new(move |event| f(event).boxed()),
        });
        self
    }

    /// Adds a map-wide handler for every event type in `mask`.
    pub fn on_map<F, Fut>(mut self, mask: EntryEventType, f: F) -> Self
    where
        F: Fn(MapEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.push(EntryHandler::Map {
            mask,
            callback: Arc::new(move |event| f(event).boxed()),
        });
        self
    }

    /// Adds a handler for added entries.
    pub fn on_added<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::ADDED, f)
    }

    /// Adds a handler for removed entries.
    pub fn on_removed<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::REMOVED, f)
    }

    /// Adds a handler for updated entries.
    pub fn on_updated<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::UPDATED, f)
    }

    /// Adds a handler for evicted entries.
    pub fn on_evicted<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::EVICTED, f)
    }

    /// Adds a handler for expired entries.
    pub fn on_expired<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::EXPIRED, f)
    }

    /// Adds a handler for merged entries.
    pub fn on_merged<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::MERGED, f)
    }

    /// Adds a handler for entries loaded from a map store.
    pub fn on_loaded<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<EntryEvent<K, V>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_entry(EntryEventType::LOADED, f)
    }

    /// Adds a handler for evict-all events.
    pub fn on_map_evicted<F, Fut>(self, f: F) -> Self
    where
        F: Fn(MapEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_map(EntryEventType::EVICT_ALL, f)
    }

    /// Adds a handler for clear events.
    pub fn on_map_cleared<F, Fut>(self, f: F) -> Self
    where
        F: Fn(MapEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_map(EntryEventType::CLEAR_ALL, f)
    }
}

impl<K, V> EntryHandlers<K, V> {
    /// Returns the union of every handler's mask.
    pub fn interest_mask(&self) -> EntryEventType {
        self.handlers
            .iter()
            .fold(EntryEventType::NOTHING, |mask, handler| mask | handler.mask())
    }

    /// Returns the registered handlers in dispatch order.
    pub fn handlers(&self) -> &[EntryHandler<K, V>] {
        &self.handlers
    }

    /// Returns the number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs every handler accepting the event, one after the other.
    ///
    /// Returns the number of handlers invoked. `NOTHING` events invoke none.
    pub async fn dispatch(&self, event: Arc<EntryEvent<K, V>>) -> usize {
        let event_type = event.event_type;
        if event_type.is_nothing() {
            return 0;
        }

        let mut invoked = 0;
        for handler in &self.handlers {
            if !handler.accepts(event_type) {
                continue;
            }
            match handler {
                EntryHandler::Entry { callback, .. } => callback(Arc::clone(&event)).await,
                EntryHandler::Map { callback, .. } => callback(event.to_map_event()).await,
            }
            invoked += 1;
        }
        tracing::trace!(event_type = %event_type, invoked, "dispatched entry event");
        invoked
    }
}

impl<K, V> Default for EntryHandlers<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for EntryHandlers<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryHandlers")
            .field("handlers", &self.handlers)
            .field("interest_mask", &self.interest_mask())
            .finish()
    }
}

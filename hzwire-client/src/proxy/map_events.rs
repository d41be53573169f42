//! Entry event subscriptions on a distributed map.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use hzwire_core::codecs::map_entry_listener::{AddEntryListenerRequest, EntryListenerCodec};
use hzwire_core::codecs::map_remove_entry_listener;
use hzwire_core::{ClientMessage, Data, HzError, NegotiatedSerialization, Result};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cluster::MemberDirectory;
use crate::config::ClientConfig;
use crate::listener::{EntryEvent, EntryEventType, EntryHandlers, LazyValue};
use crate::subscription::{SubscriptionHandler, SubscriptionId, SubscriptionManager};

/// Which filters a map subscription carries.
///
/// Chosen once when the subscription is created; it picks the codec
/// variant for every later request and event of that subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SubscriptionMode {
    /// No key, no predicate.
    All = 0,
    /// A key only.
    Key = 1,
    /// A predicate only.
    Predicate = 2,
    /// A key and a predicate.
    KeyWithPredicate = 3,
}

impl SubscriptionMode {
    /// Selects the mode for the filters present.
    pub const fn select(has_key: bool, has_predicate: bool) -> Self {
        match (has_key, has_predicate) {
            (false, false) => Self::All,
            (true, false) => Self::Key,
            (false, true) => Self::Predicate,
            (true, true) => Self::KeyWithPredicate,
        }
    }

    /// Returns the mode's integer value.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns the registration codec for this mode.
    pub const fn codec(self) -> EntryListenerCodec {
        match self {
            Self::All => EntryListenerCodec::ALL,
            Self::Key => EntryListenerCodec::TO_KEY,
            Self::Predicate => EntryListenerCodec::WITH_PREDICATE,
            Self::KeyWithPredicate => EntryListenerCodec::TO_KEY_WITH_PREDICATE,
        }
    }
}

/// One entry-listener registration: its codecs, filters and handler set.
struct EntryListenerSubscription<K, V> {
    name: String,
    mode: SubscriptionMode,
    request: AddEntryListenerRequest,
    handlers: EntryHandlers<K, V>,
    serialization: Arc<NegotiatedSerialization>,
    members: Arc<dyn MemberDirectory>,
}

impl<K, V> EntryListenerSubscription<K, V>
where
    K: Any + Send + Sync,
    V: Any + Send + Sync,
{
    fn lazy<T: Any>(&self, data: Option<Data>) -> LazyValue<T> {
        LazyValue::new(data, Arc::clone(&self.serialization))
    }
}

#[async_trait]
impl<K, V> SubscriptionHandler for EntryListenerSubscription<K, V>
where
    K: Any + Send + Sync,
    V: Any + Send + Sync,
{
    fn encode_subscribe_request(&self) -> Result<ClientMessage> {
        self.mode.codec().encode_request(&self.request)
    }

    fn decode_subscribe_response(&self, response: &ClientMessage) -> Result<Uuid> {
        self.mode.codec().decode_response(response)
    }

    fn encode_unsubscribe_request(&self, registration_id: Uuid) -> Result<ClientMessage> {
        map_remove_entry_listener::encode_request(&self.name, registration_id)
    }

    fn decode_unsubscribe_response(&self, response: &ClientMessage) -> Result<bool> {
        map_remove_entry_listener::decode_response(response)
    }

    async fn handle_event(&self, event: &ClientMessage) -> Result<()> {
        let codec = self.mode.codec();
        if !codec.is_event(event) {
            return Err(HzError::Protocol(format!(
                "unexpected message type {:#x} for {}",
                event.message_type()?,
                codec.operation_name()
            )));
        }

        let parameters = codec.decode_event(event)?;
        let member = parameters
            .member_uuid
            .and_then(|uuid| self.members.resolve_member(uuid));
        let event = EntryEvent {
            source: self.name.clone(),
            member,
            key: self.lazy(parameters.key),
            value: self.lazy(parameters.value),
            old_value: self.lazy(parameters.old_value),
            merging_value: self.lazy(parameters.merging_value),
            event_type: EntryEventType::from_bits(parameters.event_type),
            number_of_affected_entries: parameters.number_of_affected_entries,
        };

        self.handlers.dispatch(Arc::new(event)).await;
        Ok(())
    }
}

/// Entry event subscriptions of one map.
///
/// Keys are serialized through the negotiated registry, so subscriptions
/// can be created only on an authenticated client.
pub struct MapEvents<K, V> {
    name: String,
    manager: Arc<SubscriptionManager>,
    serialization: Arc<NegotiatedSerialization>,
    members: Arc<dyn MemberDirectory>,
    include_values: bool,
    _phantom: PhantomData<fn() -> (K, V)>,
}

impl<K, V> MapEvents<K, V>
where
    K: Any + Send + Sync,
    V: Any + Send + Sync,
{
    /// Creates the subscription facade of map `name`.
    pub fn new(
        name: impl Into<String>,
        manager: Arc<SubscriptionManager>,
        serialization: Arc<NegotiatedSerialization>,
        members: Arc<dyn MemberDirectory>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            name: name.into(),
            manager,
            serialization,
            members,
            include_values: config.subscription().include_values(),
            _phantom: PhantomData,
        }
    }

    /// Overrides whether events carry values.
    pub fn include_values(mut self, include: bool) -> Self {
        self.include_values = include;
        self
    }

    /// Returns the map name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes to every entry of the map.
    ///
    /// `register` receives an empty handler set and returns the populated
    /// one; it is called exactly once.
    pub async fn subscribe<F>(&self, register: F) -> Result<SubscriptionId>
    where
        F: FnOnce(EntryHandlers<K, V>) -> EntryHandlers<K, V>,
    {
        self.subscribe_with_cancel(None, None, register, &CancellationToken::new())
            .await
    }

    /// Subscribes to one key.
    pub async fn subscribe_key<F>(&self, key: &K, register: F) -> Result<SubscriptionId>
    where
        F: FnOnce(EntryHandlers<K, V>) -> EntryHandlers<K, V>,
    {
        self.subscribe_with_cancel(Some(key), None, register, &CancellationToken::new())
            .await
    }

    /// Subscribes to entries matching a serialized predicate.
    pub async fn subscribe_predicate<F>(&self, predicate: Data, register: F) -> Result<SubscriptionId>
    where
        F: FnOnce(EntryHandlers<K, V>) -> EntryHandlers<K, V>,
    {
        self.subscribe_with_cancel(None, Some(predicate), register, &CancellationToken::new())
            .await
    }

    /// Subscribes to one key, further filtered by a serialized predicate.
    pub async fn subscribe_key_predicate<F>(
        &self,
        key: &K,
        predicate: Data,
        register: F,
    ) -> Result<SubscriptionId>
    where
        F: FnOnce(EntryHandlers<K, V>) -> EntryHandlers<K, V>,
    {
        self.subscribe_with_cancel(Some(key), Some(predicate), register, &CancellationToken::new())
            .await
    }

    /// Subscribes with any filter combination, giving up when `cancel` fires.
    pub async fn subscribe_with_cancel<F>(
        &self,
        key: Option<&K>,
        predicate: Option<Data>,
        register: F,
        cancel: &CancellationToken,
    ) -> Result<SubscriptionId>
    where
        F: FnOnce(EntryHandlers<K, V>) -> EntryHandlers<K, V>,
    {
        let handlers = register(EntryHandlers::new());
        let interest = handlers.interest_mask();
        if interest.is_nothing() {
            return Err(HzError::Configuration(
                "an entry subscription needs at least one handler".to_string(),
            ));
        }

        let key = key
            .map(|key| self.serialization.registry()?.to_data(key))
            .transpose()?;
        let mode = SubscriptionMode::select(key.is_some(), predicate.is_some());
        let request = AddEntryListenerRequest {
            name: self.name.clone(),
            key,
            predicate,
            include_value: self.include_values,
            listener_flags: interest.bits(),
            // The registration sits on one connection, so it must see
            // events raised on every member.
            local_only: false,
        };

        let subscription = EntryListenerSubscription {
            name: self.name.clone(),
            mode,
            request,
            handlers,
            serialization: Arc::clone(&self.serialization),
            members: Arc::clone(&self.members),
        };
        let id = self
            .manager
            .subscribe_with_cancel(Arc::new(subscription), cancel)
            .await?;
        tracing::debug!(map = %self.name, id = %id, mode = mode.value(), interest = %interest, "entry subscription added");
        Ok(id)
    }

    /// Removes a subscription. See [`SubscriptionManager::unsubscribe`].
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.manager.unsubscribe(id).await
    }

    /// Removes a subscription, giving up the wait when `cancel` fires.
    pub async fn unsubscribe_with_cancel(
        &self,
        id: SubscriptionId,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        self.manager.unsubscribe_with_cancel(id, cancel).await
    }
}

impl<K, V> Clone for MapEvents<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            manager: Arc::clone(&self.manager),
            serialization: Arc::clone(&self.serialization),
            members: Arc::clone(&self.members),
            include_values: self.include_values,
            _phantom: PhantomData,
        }
    }
}

impl<K, V> fmt::Debug for MapEvents<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapEvents")
            .field("name", &self.name)
            .field("include_values", &self.include_values)
            .finish_non_exhaustive()
    }
}

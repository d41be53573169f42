//! An in-memory cluster member for integration tests.
//!
//! `MockCluster` implements `Transport` by answering requests with the
//! member-side codecs, and can push entry events for the registrations it
//! holds on its current connection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hzwire_client::{
    ClientConfig, ConnectionEvent, ConnectionId, MapEvents, StaticMemberDirectory,
    SubscriptionManager, SubscriptionNotification, Transport,
};
use hzwire_core::codecs::client_authentication::{self, AuthenticationResponse};
use hzwire_core::codecs::map_entry_listener::{
    AddEntryListenerRequest, EntryEventParameters, EntryListenerCodec,
};
use hzwire_core::codecs::{map_remove_entry_listener, Address};
use hzwire_core::serialization::{
    DataInput, DataOutput, ObjectDataInput, ObjectDataOutput, SERIALIZATION_VERSION,
};
use hzwire_core::{
    ClientMessage, HzError, NegotiatedSerialization, Result, SerializerRegistry, StreamSerializer,
};
use tokio::sync::broadcast;
use uuid::Uuid;

const LISTENER_CODECS: [EntryListenerCodec; 4] = [
    EntryListenerCodec::ALL,
    EntryListenerCodec::TO_KEY,
    EntryListenerCodec::WITH_PREDICATE,
    EntryListenerCodec::TO_KEY_WITH_PREDICATE,
];

/// A listener registration held by the mock member.
#[derive(Debug, Clone)]
pub struct MemberRegistration {
    pub connection: ConnectionId,
    pub correlation_id: i64,
    pub codec: EntryListenerCodec,
    pub request: AddEntryListenerRequest,
}

/// A request as the mock member received it.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub connection: ConnectionId,
    pub message_type: i32,
    pub correlation_id: i64,
}

pub struct MockCluster {
    member_uuid: Uuid,
    current: Mutex<Option<ConnectionId>>,
    connection_events: broadcast::Sender<ConnectionEvent>,
    registrations: Mutex<HashMap<Uuid, MemberRegistration>>,
    received: Mutex<Vec<ReceivedRequest>>,
    refuse_subscribes: AtomicBool,
    response_delay: Mutex<Option<Duration>>,
}

impl MockCluster {
    pub fn new() -> Arc<Self> {
        let (connection_events, _) = broadcast::channel(16);
        Arc::new(Self {
            member_uuid: Uuid::new_v4(),
            current: Mutex::new(None),
            connection_events,
            registrations: Mutex::new(HashMap::new()),
            received: Mutex::new(Vec::new()),
            refuse_subscribes: AtomicBool::new(false),
            response_delay: Mutex::new(None),
        })
    }

    pub fn member_uuid(&self) -> Uuid {
        self.member_uuid
    }

    /// Opens a new connection and announces it.
    pub fn connect(&self) -> ConnectionId {
        let id = ConnectionId::new();
        *self.current.lock().unwrap() = Some(id);
        let _ = self
            .connection_events
            .send(ConnectionEvent::Connected { id });
        id
    }

    /// Closes the current connection, dropping its registrations, and
    /// opens a replacement.
    pub fn replace_connection(&self) -> ConnectionId {
        self.disconnect();
        self.connect()
    }

    /// Closes the current connection without opening another.
    pub fn disconnect(&self) {
        if let Some(old) = self.current.lock().unwrap().take() {
            self.registrations
                .lock()
                .unwrap()
                .retain(|_, registration| registration.connection != old);
            let _ = self.connection_events.send(ConnectionEvent::Disconnected {
                id: old,
                error: None,
            });
        }
    }

    pub fn refuse_subscribes(&self, refuse: bool) {
        self.refuse_subscribes.store(refuse, Ordering::SeqCst);
    }

    pub fn delay_responses(&self, delay: Option<Duration>) {
        *self.response_delay.lock().unwrap() = delay;
    }

    pub fn registrations(&self) -> Vec<MemberRegistration> {
        self.registrations.lock().unwrap().values().cloned().collect()
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }

    pub fn received_of_type(&self, message_type: i32) -> Vec<ReceivedRequest> {
        self.received()
            .into_iter()
            .filter(|request| request.message_type == message_type)
            .collect()
    }

    /// Builds the event messages the member would push for `event` to every
    /// registration on the current connection.
    pub fn events_for(&self, event: &EntryEventParameters) -> Vec<(ConnectionId, ClientMessage)> {
        let current = *self.current.lock().unwrap();
        self.registrations()
            .into_iter()
            .filter(|registration| Some(registration.connection) == current)
            .map(|registration| {
                let mut message = registration.codec.encode_event(event).unwrap();
                message
                    .set_correlation_id(registration.correlation_id)
                    .unwrap();
                (registration.connection, message)
            })
            .collect()
    }

    /// Pushes `event` through `manager`, returning how many messages were sent.
    pub async fn publish(&self, manager: &SubscriptionManager, event: &EntryEventParameters) -> usize {
        let messages = self.events_for(event);
        let count = messages.len();
        for (connection, message) in messages {
            manager.handle_event(connection, message).await;
        }
        count
    }

    fn answer(&self, connection: ConnectionId, request: &ClientMessage) -> Result<ClientMessage> {
        let message_type = request.message_type()?;
        let correlation_id = request.correlation_id()?;
        self.received.lock().unwrap().push(ReceivedRequest {
            connection,
            message_type,
            correlation_id,
        });

        if let Some(codec) = LISTENER_CODECS
            .iter()
            .find(|codec| codec.request_message_type() == message_type)
        {
            if self.refuse_subscribes.load(Ordering::SeqCst) {
                return Err(HzError::Connection("member refused the request".to_string()));
            }
            let decoded = codec.decode_request(request)?;
            let registration_id = Uuid::new_v4();
            self.registrations.lock().unwrap().insert(
                registration_id,
                MemberRegistration {
                    connection,
                    correlation_id,
                    codec: *codec,
                    request: decoded,
                },
            );
            return codec.encode_response(registration_id);
        }

        match message_type {
            map_remove_entry_listener::REQUEST_MESSAGE_TYPE => {
                let (_, registration_id) = map_remove_entry_listener::decode_request(request)?;
                let removed = registration_id
                    .and_then(|id| self.registrations.lock().unwrap().remove(&id))
                    .is_some();
                map_remove_entry_listener::encode_response(removed)
            }
            client_authentication::REQUEST_MESSAGE_TYPE => {
                let auth = client_authentication::decode_request(request)?;
                client_authentication::encode_response(&AuthenticationResponse {
                    status: 0,
                    address: Some(Address::new("127.0.0.1", 5701)),
                    member_uuid: Some(self.member_uuid),
                    serialization_version: auth.serialization_version,
                    server_version: "5.3.0".to_string(),
                    partition_count: 271,
                    cluster_id: Some(Uuid::new_v4()),
                    failover_supported: false,
                })
            }
            other => Err(HzError::Protocol(format!(
                "mock member cannot answer message type {other:#x}"
            ))),
        }
    }
}

#[async_trait]
impl Transport for MockCluster {
    fn current_connection(&self) -> Option<ConnectionId> {
        *self.current.lock().unwrap()
    }

    async fn send(&self, connection: ConnectionId, request: ClientMessage) -> Result<ClientMessage> {
        if Some(connection) != self.current_connection() {
            return Err(HzError::Connection(format!("{connection} is closed")));
        }
        let mut response = self.answer(connection, &request)?;
        let delay = *self.response_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response.set_correlation_id(request.correlation_id()?)?;
        Ok(response)
    }

    fn subscribe_connection_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.connection_events.subscribe()
    }
}

/// A product code with a serializer that counts how often it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sku(pub String);

pub const SKU_TYPE_ID: i32 = 1001;

#[derive(Debug, Clone, Default)]
pub struct CountingSkuSerializer {
    reads: Arc<AtomicUsize>,
}

impl CountingSkuSerializer {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl PartialEq for CountingSkuSerializer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.reads, &other.reads)
    }
}

impl StreamSerializer for CountingSkuSerializer {
    type Value = Sku;

    fn serializer_id(&self) -> i32 {
        SKU_TYPE_ID
    }

    fn write(&self, output: &mut ObjectDataOutput, value: &Sku) -> Result<()> {
        output.write_string(&value.0)
    }

    fn read(&self, input: &mut ObjectDataInput<'_>) -> Result<Sku> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Sku(input.read_string()?))
    }
}

/// Everything a test needs: the mock member, a manager wired to it and a
/// negotiated serialization with the counting serializer registered.
pub struct Harness {
    pub cluster: Arc<MockCluster>,
    pub manager: Arc<SubscriptionManager>,
    pub serialization: Arc<NegotiatedSerialization>,
    pub members: Arc<StaticMemberDirectory>,
    pub skus: CountingSkuSerializer,
    pub config: ClientConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(
            ClientConfig::builder()
                .subscription(|s| s.operation_timeout(Duration::from_secs(2)))
                .build()
                .unwrap(),
        )
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let cluster = MockCluster::new();
        cluster.connect();

        let skus = CountingSkuSerializer::default();
        let mut builder = SerializerRegistry::builder();
        builder.register(skus.clone()).unwrap();
        let serialization = NegotiatedSerialization::new(Arc::new(builder.build()));
        serialization.negotiate(SERIALIZATION_VERSION).unwrap();

        let transport: Arc<dyn Transport> = cluster.clone();
        let manager = Arc::new(SubscriptionManager::new(
            transport,
            config.subscription().clone(),
        ));

        Self {
            cluster,
            manager,
            serialization: Arc::new(serialization),
            members: Arc::new(StaticMemberDirectory::new()),
            skus,
            config,
        }
    }

    pub fn map<K, V>(&self, name: &str) -> MapEvents<K, V>
    where
        K: std::any::Any + Send + Sync,
        V: std::any::Any + Send + Sync,
    {
        let members: Arc<dyn hzwire_client::MemberDirectory> = self.members.clone();
        MapEvents::new(
            name,
            Arc::clone(&self.manager),
            Arc::clone(&self.serialization),
            members,
            &self.config,
        )
    }

    /// Builds entry event parameters with serialized key and value.
    pub fn event<K, V>(&self, event_type: i32, key: &K, value: Option<&V>) -> EntryEventParameters
    where
        K: std::any::Any + Send + Sync,
        V: std::any::Any + Send + Sync,
    {
        let registry = self.serialization.registry().unwrap();
        EntryEventParameters {
            key: Some(registry.to_data(key).unwrap()),
            value: value.map(|value| registry.to_data(value).unwrap()),
            old_value: None,
            merging_value: None,
            event_type,
            member_uuid: Some(self.cluster.member_uuid()),
            number_of_affected_entries: 1,
        }
    }
}

/// Waits for the next notification matching `predicate`.
pub async fn next_notification<F>(
    notifications: &mut broadcast::Receiver<SubscriptionNotification>,
    mut predicate: F,
) -> SubscriptionNotification
where
    F: FnMut(&SubscriptionNotification) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let notification = notifications.recv().await.unwrap();
            if predicate(&notification) {
                return notification;
            }
        }
    })
    .await
    .expect("no matching notification")
}

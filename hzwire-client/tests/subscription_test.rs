//! Subscription lifecycle tests against an in-memory member.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{next_notification, Harness, MockCluster, Sku};
use hzwire_client::handshake::authenticate;
use hzwire_client::{
    ClientConfig, ConnectionEvent, ConnectionId, EntryEvent, EntryEventType, EntryHandlers,
    InboundEvent, MapEvents, Member, MemberDirectory, SubscriptionId, SubscriptionManager,
    SubscriptionNotification, SubscriptionState, Transport,
};
use hzwire_core::codecs::map_entry_listener::{EntryEventParameters, EntryListenerCodec};
use hzwire_core::codecs::map_remove_entry_listener;
use hzwire_core::{ClientMessage, HzError, NegotiatedSerialization, SerializerRegistry};
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&count), count)
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached");
}

#[tokio::test]
async fn test_subscribe_delivers_events() {
    let harness = Harness::new();
    harness.members.add(Member::new(harness.cluster.member_uuid(), None));
    let orders = harness.map::<String, String>("orders");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = orders
        .subscribe(move |handlers| {
            handlers.on_added(move |event| {
                let key = event.key.get().unwrap().cloned();
                let value = event.value.get().unwrap().cloned();
                let member = event.member.as_ref().map(Member::uuid);
                sink.lock().unwrap().push((key, value, member));
                async {}
            })
        })
        .await
        .unwrap();

    assert_eq!(harness.manager.state(id).await, Some(SubscriptionState::Active));
    assert_eq!(harness.cluster.registration_count(), 1);

    let event = harness.event(1, &"o-1".to_string(), Some(&"pending".to_string()));
    assert_eq!(harness.cluster.publish(&harness.manager, &event).await, 1);

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![(
            Some("o-1".to_string()),
            Some("pending".to_string()),
            Some(harness.cluster.member_uuid())
        )]
    );
    assert_eq!(harness.manager.stats().messages_received(), 1);
    assert_eq!(harness.manager.stats().events_dispatched(), 1);
}

#[tokio::test]
async fn test_request_carries_interest_mask_and_flags() {
    let config = ClientConfig::builder()
        .smart_routing(false)
        .subscription(|s| s.include_values(false))
        .build()
        .unwrap();
    let harness = Harness::with_config(config);
    let orders = harness.map::<String, String>("orders");

    orders
        .subscribe(|handlers| {
            handlers
                .on_added(|_| async {})
                .on_expired(|_| async {})
                .on_map_cleared(|_| async {})
        })
        .await
        .unwrap();

    let registration = &harness.cluster.registrations()[0];
    assert_eq!(registration.request.name, "orders");
    assert_eq!(registration.request.listener_flags, 1 | 16 | 64);
    assert!(!registration.request.include_value);
    assert!(!registration.request.local_only);
}

#[tokio::test]
async fn test_modes_route_to_their_codecs() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let predicate = harness
        .serialization
        .registry()
        .unwrap()
        .to_data(&"status = 'open'".to_string())
        .unwrap();
    let key = "o-1".to_string();

    let (all_count, all) = counter();
    let (key_count, by_key) = counter();
    let (predicate_count, by_predicate) = counter();
    let (both_count, by_both) = counter();

    let handler = |count: Arc<AtomicUsize>| {
        move |handlers: EntryHandlers<String, String>| {
            handlers.on_updated(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                async {}
            })
        }
    };

    orders.subscribe(handler(all)).await.unwrap();
    orders.subscribe_key(&key, handler(by_key)).await.unwrap();
    orders
        .subscribe_predicate(predicate.clone(), handler(by_predicate))
        .await
        .unwrap();
    orders
        .subscribe_key_predicate(&key, predicate.clone(), handler(by_both))
        .await
        .unwrap();

    let request_types: Vec<i32> = harness
        .cluster
        .received()
        .iter()
        .map(|request| request.message_type)
        .collect();
    assert_eq!(
        request_types,
        vec![
            EntryListenerCodec::ALL.request_message_type(),
            EntryListenerCodec::TO_KEY.request_message_type(),
            EntryListenerCodec::WITH_PREDICATE.request_message_type(),
            EntryListenerCodec::TO_KEY_WITH_PREDICATE.request_message_type(),
        ]
    );

    for registration in harness.cluster.registrations() {
        let codec = registration.codec;
        assert_eq!(
            registration.request.key.is_some(),
            codec == EntryListenerCodec::TO_KEY || codec == EntryListenerCodec::TO_KEY_WITH_PREDICATE
        );
        assert_eq!(
            registration.request.predicate.as_ref(),
            if codec == EntryListenerCodec::WITH_PREDICATE
                || codec == EntryListenerCodec::TO_KEY_WITH_PREDICATE
            {
                Some(&predicate)
            } else {
                None
            }
        );
    }

    let event = harness.event(4, &key, Some(&"shipped".to_string()));
    assert_eq!(harness.cluster.publish(&harness.manager, &event).await, 4);
    for count in [&all_count, &key_count, &predicate_count, &both_count] {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn test_event_masking_and_handler_order() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let log = Arc::new(Mutex::new(Vec::new()));

    let record = |name: &'static str| {
        let log = Arc::clone(&log);
        move |_: Arc<EntryEvent<String, String>>| {
            log.lock().unwrap().push(name);
            async {}
        }
    };
    orders
        .subscribe(|handlers| {
            handlers
                .on_entry(EntryEventType::ADDED | EntryEventType::UPDATED, record("first"))
                .on_removed(record("removed"))
                .on_added(record("second"))
        })
        .await
        .unwrap();

    let key = "o-1".to_string();
    harness
        .cluster
        .publish(&harness.manager, &harness.event::<_, String>(1, &key, None))
        .await;
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);

    log.lock().unwrap().clear();
    harness
        .cluster
        .publish(&harness.manager, &harness.event::<_, String>(0, &key, None))
        .await;
    assert!(log.lock().unwrap().is_empty());

    harness
        .cluster
        .publish(&harness.manager, &harness.event::<_, String>(2, &key, None))
        .await;
    assert_eq!(*log.lock().unwrap(), vec!["removed"]);
}

#[tokio::test]
async fn test_lazy_fields_deserialize_once() {
    let harness = Harness::new();
    let skus = harness.map::<Sku, String>("inventory");

    let reads_seen = Arc::new(Mutex::new(Vec::new()));
    let (first_seen, second_seen) = (Arc::clone(&reads_seen), Arc::clone(&reads_seen));
    skus.subscribe(move |handlers| {
        handlers
            .on_added(move |event| {
                let a = event.key.get().unwrap().cloned();
                let b = event.key.get().unwrap().cloned();
                first_seen.lock().unwrap().push((a, b, event.value.is_resolved()));
                async {}
            })
            .on_added(move |event| {
                second_seen
                    .lock()
                    .unwrap()
                    .push((event.key.get().unwrap().cloned(), None, event.key.is_resolved()));
                async {}
            })
    })
    .await
    .unwrap();

    let sku = Sku("SKU-9".to_string());
    let event = harness.event(1, &sku, Some(&"in stock".to_string()));
    harness.cluster.publish(&harness.manager, &event).await;

    assert_eq!(harness.skus.reads(), 1);
    let seen = reads_seen.lock().unwrap();
    assert_eq!(seen[0], (Some(sku.clone()), Some(sku.clone()), false));
    assert_eq!(seen[1], (Some(sku), None, true));

    drop(seen);
    harness.cluster.publish(&harness.manager, &event).await;
    assert_eq!(harness.skus.reads(), 2);
}

#[tokio::test]
async fn test_reconnect_keeps_subscription_id() {
    let harness = Harness::new();
    let listener = harness.manager.spawn_connection_listener();
    let mut notifications = harness.manager.notifications();
    let orders = harness.map::<String, String>("orders");

    let (delivered, count) = counter();
    let id = orders
        .subscribe(move |handlers| {
            handlers.on_added(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                async {}
            })
        })
        .await
        .unwrap();
    let first_registration = harness.manager.registration_id(id).await.unwrap();
    let key = "o-1".to_string();
    let event = harness.event::<_, String>(1, &key, None);
    let stale = harness.cluster.events_for(&event);

    let new_connection = harness.cluster.replace_connection();
    let notification = next_notification(&mut notifications, |n| {
        matches!(n, SubscriptionNotification::Reinstalled { .. })
    })
    .await;
    assert_eq!(
        notification,
        SubscriptionNotification::Reinstalled {
            id,
            connection: new_connection
        }
    );

    assert_eq!(harness.manager.state(id).await, Some(SubscriptionState::Active));
    let second_registration = harness.manager.registration_id(id).await.unwrap();
    assert_ne!(first_registration, second_registration);

    let subscribes =
        harness.cluster.received_of_type(EntryListenerCodec::ALL.request_message_type());
    assert_eq!(subscribes.len(), 2);
    assert_ne!(subscribes[0].connection, subscribes[1].connection);
    assert_ne!(subscribes[0].correlation_id, subscribes[1].correlation_id);
    assert_eq!(subscribes[1].connection, new_connection);

    for (connection, message) in stale {
        harness.manager.handle_event(connection, message).await;
    }
    assert_eq!(delivered.load(Ordering::SeqCst), 0);

    harness.cluster.publish(&harness.manager, &event).await;
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
    assert_eq!(harness.manager.stats().reinstalls(), 1);

    listener.abort();
}

#[tokio::test]
async fn test_failed_reinstall_is_reported_and_retried() {
    let harness = Harness::new();
    let listener = harness.manager.spawn_connection_listener();
    let mut notifications = harness.manager.notifications();
    let orders = harness.map::<String, String>("orders");
    let id = orders
        .subscribe(|handlers| handlers.on_added(|_| async {}))
        .await
        .unwrap();

    harness.cluster.refuse_subscribes(true);
    harness.cluster.replace_connection();
    let failure = next_notification(&mut notifications, |n| {
        matches!(n, SubscriptionNotification::ReinstallFailed { .. })
    })
    .await;
    assert_eq!(failure.id(), id);
    assert!(matches!(
        failure.error(),
        Some(HzError::SubscriptionReinstallFailed { id: failed, .. }) if failed == id.as_uuid()
    ));
    assert_eq!(harness.manager.state(id).await, Some(SubscriptionState::Failed));
    assert_eq!(harness.cluster.registration_count(), 0);

    harness.cluster.refuse_subscribes(false);
    harness.cluster.replace_connection();
    next_notification(&mut notifications, |n| {
        matches!(n, SubscriptionNotification::Reinstalled { id: reinstalled, .. } if *reinstalled == id)
    })
    .await;
    assert_eq!(harness.manager.state(id).await, Some(SubscriptionState::Active));
    assert_eq!(harness.cluster.registration_count(), 1);

    listener.abort();
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let (delivered, count) = counter();
    let id = orders
        .subscribe(move |handlers| {
            handlers.on_added(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                async {}
            })
        })
        .await
        .unwrap();
    let event = harness.event::<_, String>(1, &"o-1".to_string(), None);
    let pending_events = harness.cluster.events_for(&event);

    assert!(orders.unsubscribe(id).await.unwrap());
    assert_eq!(harness.cluster.registration_count(), 0);
    assert_eq!(harness.manager.state(id).await, None);
    assert!(harness.manager.is_empty().await);

    assert!(!orders.unsubscribe(id).await.unwrap());
    assert_eq!(
        harness
            .cluster
            .received_of_type(map_remove_entry_listener::REQUEST_MESSAGE_TYPE)
            .len(),
        1
    );

    for (connection, message) in pending_events {
        harness.manager.handle_event(connection, message).await;
    }
    assert_eq!(delivered.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unsubscribe_reports_member_side_state() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let id = orders
        .subscribe(|handlers| handlers.on_added(|_| async {}))
        .await
        .unwrap();

    // The connection dies before the member is told; the registration went with it.
    harness.cluster.disconnect();
    assert!(!orders.unsubscribe(id).await.unwrap());
    assert_eq!(harness.manager.state(id).await, None);
}

#[tokio::test]
async fn test_unsubscribe_waits_for_reinstall() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let id = orders
        .subscribe(|handlers| handlers.on_added(|_| async {}))
        .await
        .unwrap();

    harness.cluster.delay_responses(Some(Duration::from_millis(200)));
    let new_connection = harness.cluster.replace_connection();
    let manager = Arc::clone(&harness.manager);
    let reinstall = tokio::spawn(async move {
        manager
            .handle_connection_event(ConnectionEvent::Connected { id: new_connection })
            .await;
    });
    wait_until(|| harness.cluster.registration_count() == 1).await;

    assert!(orders.unsubscribe(id).await.unwrap());
    reinstall.await.unwrap();
    assert_eq!(harness.cluster.registration_count(), 0);
    assert_eq!(harness.manager.state(id).await, None);
}

#[tokio::test]
async fn test_cancelled_subscribe_releases_registration() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    harness.cluster.delay_responses(Some(Duration::from_millis(300)));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = orders
        .subscribe_with_cancel(None, None, |h| h.on_added(|_| async {}), &cancel)
        .await;
    assert!(matches!(result, Err(HzError::OperationCancelled)));
    assert!(harness.manager.is_empty().await);

    wait_until(|| harness.cluster.registration_count() == 0).await;
    assert_eq!(
        harness
            .cluster
            .received_of_type(map_remove_entry_listener::REQUEST_MESSAGE_TYPE)
            .len(),
        1
    );
}

#[tokio::test]
async fn test_cancelled_before_start_sends_nothing() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = orders
        .subscribe_with_cancel(None, None, |h| h.on_added(|_| async {}), &cancel)
        .await;
    assert!(matches!(result, Err(HzError::OperationCancelled)));
    assert!(harness.cluster.received().is_empty());
}

#[tokio::test]
async fn test_subscribe_timeout_releases_registration() {
    let config = ClientConfig::builder()
        .subscription(|s| s.operation_timeout(Duration::from_millis(50)))
        .build()
        .unwrap();
    let harness = Harness::with_config(config);
    let orders = harness.map::<String, String>("orders");
    harness.cluster.delay_responses(Some(Duration::from_millis(200)));

    let result = orders.subscribe(|h| h.on_added(|_| async {})).await;
    assert!(matches!(result, Err(HzError::Timeout(_))));

    wait_until(|| {
        !harness
            .cluster
            .received_of_type(map_remove_entry_listener::REQUEST_MESSAGE_TYPE)
            .is_empty()
    })
    .await;
    wait_until(|| harness.cluster.registration_count() == 0).await;
}

#[tokio::test]
async fn test_subscribe_without_connection_fails() {
    let harness = Harness::new();
    harness.cluster.disconnect();
    let orders = harness.map::<String, String>("orders");

    let result = orders.subscribe(|h| h.on_added(|_| async {})).await;
    assert!(matches!(result, Err(HzError::Connection(_))));
    assert!(harness.manager.is_empty().await);
}

#[tokio::test]
async fn test_subscription_without_handlers_is_rejected() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");

    let result = orders.subscribe(|handlers| handlers).await;
    assert!(matches!(result, Err(HzError::Configuration(_))));
    assert!(harness.cluster.received().is_empty());
}

#[tokio::test]
async fn test_event_pump_preserves_order() {
    let harness = Harness::new();
    let orders = harness.map::<String, i32>("orders");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    orders
        .subscribe(move |handlers| {
            handlers.on_updated(move |event| {
                let value = *event.value.get().unwrap().unwrap();
                let sink = Arc::clone(&sink);
                async move {
                    tokio::task::yield_now().await;
                    sink.lock().unwrap().push(value);
                }
            })
        })
        .await
        .unwrap();

    let (tx, rx) = mpsc::channel(32);
    let pump = harness.manager.spawn_event_pump(rx);
    let key = "o-1".to_string();
    for value in 0..10 {
        for (connection, message) in harness.cluster.events_for(&harness.event(4, &key, Some(&value))) {
            tx.send(InboundEvent { connection, message }).await.unwrap();
        }
    }
    drop(tx);
    pump.await.unwrap();

    assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_shutdown_removes_everything() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    for _ in 0..3 {
        orders
            .subscribe(|h| h.on_added(|_| async {}))
            .await
            .unwrap();
    }
    assert_eq!(harness.manager.len().await, 3);

    harness.manager.shutdown().await;
    assert!(harness.manager.is_empty().await);
    assert_eq!(harness.cluster.registration_count(), 0);
}

#[tokio::test]
async fn test_watch_state_follows_reinstall() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let id = orders
        .subscribe(|h| h.on_added(|_| async {}))
        .await
        .unwrap();
    let mut state = harness.manager.watch_state(id).await.unwrap();
    assert_eq!(*state.borrow(), SubscriptionState::Active);

    harness.cluster.refuse_subscribes(true);
    let connection = harness.cluster.replace_connection();
    harness
        .manager
        .handle_connection_event(ConnectionEvent::Connected { id: connection })
        .await;
    state.changed().await.unwrap();
    assert_eq!(*state.borrow_and_update(), SubscriptionState::Failed);
}

#[tokio::test]
async fn test_authentication_negotiates_serialization() {
    let cluster = MockCluster::new();
    let connection = cluster.connect();
    let config = ClientConfig::builder().client_name("tests").build().unwrap();
    let serialization =
        NegotiatedSerialization::new(Arc::new(SerializerRegistry::builder().build()));
    assert!(serialization.registry().is_err());

    let member = authenticate(&*cluster, connection, &config, Uuid::new_v4(), &serialization)
        .await
        .unwrap();
    assert_eq!(member.member.uuid(), cluster.member_uuid());
    assert_eq!(member.partition_count, 271);
    assert!(serialization.registry().is_ok());
}

/// Answers through the mock member, but pushes an entry event for every new
/// registration onto the event pump before handing back the response.
struct EagerMember {
    cluster: Arc<MockCluster>,
    events: mpsc::Sender<InboundEvent>,
    event: EntryEventParameters,
}

#[async_trait]
impl Transport for EagerMember {
    fn current_connection(&self) -> Option<ConnectionId> {
        self.cluster.current_connection()
    }

    async fn send(
        &self,
        connection: ConnectionId,
        request: ClientMessage,
    ) -> hzwire_core::Result<ClientMessage> {
        let message_type = request.message_type()?;
        let correlation_id = request.correlation_id()?;
        let response = self.cluster.send(connection, request).await?;

        if message_type == EntryListenerCodec::ALL.request_message_type() {
            let mut message = EntryListenerCodec::ALL.encode_event(&self.event)?;
            message.set_correlation_id(correlation_id)?;
            self.events
                .send(InboundEvent { connection, message })
                .await
                .map_err(|_| HzError::Connection("event pump stopped".to_string()))?;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok(response)
    }

    fn subscribe_connection_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.cluster.subscribe_connection_events()
    }
}

#[tokio::test]
async fn test_events_before_subscribe_response_are_delivered() {
    let harness = Harness::new();
    let (tx, rx) = mpsc::channel(8);
    let transport: Arc<dyn Transport> = Arc::new(EagerMember {
        cluster: Arc::clone(&harness.cluster),
        events: tx,
        event: harness.event::<_, String>(1, &"o-1".to_string(), None),
    });
    let manager = Arc::new(SubscriptionManager::new(
        transport,
        harness.config.subscription().clone(),
    ));
    let pump = manager.spawn_event_pump(rx);
    let members: Arc<dyn MemberDirectory> = harness.members.clone();
    let orders = MapEvents::<String, String>::new(
        "orders",
        Arc::clone(&manager),
        Arc::clone(&harness.serialization),
        members,
        &harness.config,
    );

    let (delivered, count) = counter();
    let id = orders
        .subscribe(move |handlers| {
            handlers.on_added(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                async {}
            })
        })
        .await
        .unwrap();
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
    assert_eq!(manager.stats().events_dispatched(), 1);

    let connection = harness.cluster.replace_connection();
    manager
        .handle_connection_event(ConnectionEvent::Connected { id: connection })
        .await;
    assert_eq!(manager.state(id).await, Some(SubscriptionState::Active));
    assert_eq!(delivered.load(Ordering::SeqCst), 2);

    pump.abort();
}

#[tokio::test]
async fn test_subscriptions_ask_for_cluster_wide_events() {
    let harness = Harness::new();
    assert!(harness.config.smart_routing());
    let orders = harness.map::<String, String>("orders");
    let key = "o-1".to_string();

    orders.subscribe(|h| h.on_added(|_| async {})).await.unwrap();
    orders
        .subscribe_key(&key, |h| h.on_added(|_| async {}))
        .await
        .unwrap();

    let registrations = harness.cluster.registrations();
    assert_eq!(registrations.len(), 2);
    assert!(registrations
        .iter()
        .all(|registration| !registration.request.local_only));
}

#[tokio::test]
async fn test_handler_can_unsubscribe_itself() {
    let harness = Harness::new();
    let orders = harness.map::<String, String>("orders");
    let own_id: Arc<OnceLock<SubscriptionId>> = Arc::new(OnceLock::new());
    let results = Arc::new(Mutex::new(Vec::new()));

    let (facade, slot, sink) = (orders.clone(), Arc::clone(&own_id), Arc::clone(&results));
    let id = orders
        .subscribe(move |handlers| {
            handlers.on_added(move |_| {
                let (facade, slot, sink) = (facade.clone(), Arc::clone(&slot), Arc::clone(&sink));
                async move {
                    let id = *slot.get().unwrap();
                    let removed = facade.unsubscribe(id).await.unwrap();
                    sink.lock().unwrap().push(removed);
                }
            })
        })
        .await
        .unwrap();
    own_id.set(id).unwrap();

    let event = harness.event::<_, String>(1, &"o-1".to_string(), None);
    let pending = harness.cluster.events_for(&event);
    for (connection, message) in pending.iter().cloned().chain(pending.clone()) {
        harness.manager.handle_event(connection, message).await;
    }

    assert_eq!(*results.lock().unwrap(), vec![true]);
    assert_eq!(harness.manager.state(id).await, None);
    assert_eq!(harness.cluster.registration_count(), 0);
}

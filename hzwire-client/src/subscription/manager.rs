use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hzwire_core::protocol::next_correlation_id;
use hzwire_core::{ClientMessage, HzError, Result};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::{SubscriptionHandler, SubscriptionId, SubscriptionNotification, SubscriptionState};
use crate::config::SubscriptionConfig;
use crate::listener::ListenerStats;
use crate::transport::{ConnectionEvent, ConnectionId, InboundEvent, Transport};

type PendingResponse = JoinHandle<Result<ClientMessage>>;

enum Outcome {
    Completed(Result<ClientMessage>),
    /// Cancelled or timed out; the request task is still running.
    Interrupted {
        error: HzError,
        pending: PendingResponse,
    },
}

/// Where events for one correlation id belong.
#[derive(Debug, Clone, Copy)]
struct Route {
    id: SubscriptionId,
    connection: ConnectionId,
}

/// The member-side half of a subscription.
#[derive(Debug, Default)]
struct Registration {
    connection: Option<ConnectionId>,
    registration_id: Option<Uuid>,
    correlation_id: Option<i64>,
}

struct SubscriptionEntry {
    id: SubscriptionId,
    handler: Arc<dyn SubscriptionHandler>,
    request: ClientMessage,
    registration: Mutex<Registration>,
    state: watch::Sender<SubscriptionState>,
}

impl SubscriptionEntry {
    fn state(&self) -> SubscriptionState {
        *self.state.borrow()
    }

    fn set_state(&self, state: SubscriptionState) {
        let previous = self.state.send_replace(state);
        trace!(id = %self.id, from = ?previous, to = ?state, "subscription state changed");
    }
}

/// Owns every subscription of a client.
///
/// The table is shared by install, reinstall, unsubscribe and event
/// dispatch. Each subscription carries its own lock: a reinstall holds it
/// for its whole round-trip, so a concurrent unsubscribe of the same id
/// waits until the member-side registration it must remove exists.
pub struct SubscriptionManager {
    transport: Arc<dyn Transport>,
    config: SubscriptionConfig,
    subscriptions: RwLock<HashMap<SubscriptionId, Arc<SubscriptionEntry>>>,
    routes: RwLock<HashMap<i64, Route>>,
    notifications: broadcast::Sender<SubscriptionNotification>,
    stats: Arc<ListenerStats>,
}

impl SubscriptionManager {
    /// Creates a manager sending through `transport`.
    pub fn new(transport: Arc<dyn Transport>, config: SubscriptionConfig) -> Self {
        let (notifications, _) = broadcast::channel(config.notification_capacity());
        Self {
            transport,
            config,
            subscriptions: RwLock::new(HashMap::new()),
            routes: RwLock::new(HashMap::new()),
            notifications,
            stats: Arc::new(ListenerStats::new()),
        }
    }

    /// Returns the subscription configuration.
    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    /// Returns the counters shared by all subscriptions.
    pub fn stats(&self) -> &Arc<ListenerStats> {
        &self.stats
    }

    /// Subscribes to state change notifications.
    pub fn notifications(&self) -> broadcast::Receiver<SubscriptionNotification> {
        self.notifications.subscribe()
    }

    /// Installs a subscription on the current connection.
    pub async fn subscribe(&self, handler: Arc<dyn SubscriptionHandler>) -> Result<SubscriptionId> {
        self.subscribe_with_cancel(handler, &CancellationToken::new())
            .await
    }

    /// Installs a subscription, giving up when `cancel` fires.
    ///
    /// A cancelled or timed out subscribe never leaves a registration behind
    /// knowingly: if the request already went out, its response is awaited in
    /// the background and the registration it created is removed.
    pub async fn subscribe_with_cancel(
        &self,
        handler: Arc<dyn SubscriptionHandler>,
        cancel: &CancellationToken,
    ) -> Result<SubscriptionId> {
        if cancel.is_cancelled() {
            return Err(HzError::OperationCancelled);
        }
        let request = handler.encode_subscribe_request()?;
        let (state, _) = watch::channel(SubscriptionState::Created);
        let entry = Arc::new(SubscriptionEntry {
            id: SubscriptionId::new(),
            handler,
            request,
            registration: Mutex::new(Registration::default()),
            state,
        });
        let id = entry.id;

        let mut registration = entry.registration.lock().await;
        entry.set_state(SubscriptionState::Installing);
        self.subscriptions
            .write()
            .await
            .insert(id, Arc::clone(&entry));

        let installed = match self.transport.current_connection() {
            Some(connection) => {
                self.install(&entry, &mut registration, connection, cancel)
                    .await
            }
            None => Err(HzError::Connection("no open connection".to_string())),
        };

        match installed {
            Ok(()) => {
                entry.set_state(SubscriptionState::Active);
                debug!(
                    id = %id,
                    connection = ?registration.connection,
                    registration_id = ?registration.registration_id,
                    "subscription installed"
                );
                Ok(id)
            }
            Err(err) => {
                self.subscriptions.write().await.remove(&id);
                entry.set_state(SubscriptionState::Removed);
                debug!(id = %id, error = %err, "subscription install failed");
                Err(err)
            }
        }
    }

    /// Removes a subscription.
    ///
    /// Local state is removed unconditionally; the result only says whether
    /// the member still had the registration. Unknown or already removed ids
    /// yield `Ok(false)`. Events arriving after this returns are dropped;
    /// see [`handle_event`](Self::handle_event) for one already dispatching.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.unsubscribe_with_cancel(id, &CancellationToken::new())
            .await
    }

    /// Removes a subscription, giving up the wait when `cancel` fires.
    ///
    /// Local state is gone either way. A request already sent still reaches
    /// the member.
    pub async fn unsubscribe_with_cancel(
        &self,
        id: SubscriptionId,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let entry = self.subscriptions.read().await.get(&id).cloned();
        let Some(entry) = entry else {
            return Ok(false);
        };

        let mut registration = entry.registration.lock().await;
        if entry.state() == SubscriptionState::Removed {
            return Ok(false);
        }
        self.subscriptions.write().await.remove(&id);
        self.drop_route(&mut registration).await;
        entry.set_state(SubscriptionState::Removed);
        let _ = self
            .notifications
            .send(SubscriptionNotification::Removed { id });

        let (Some(connection), Some(registration_id)) =
            (registration.connection.take(), registration.registration_id.take())
        else {
            debug!(id = %id, "removed subscription without a live registration");
            return Ok(false);
        };

        let mut request = entry.handler.encode_unsubscribe_request(registration_id)?;
        request.set_correlation_id(next_correlation_id())?;
        let removed = match self.round_trip(connection, request, cancel).await {
            Outcome::Completed(Ok(response)) => entry.handler.decode_unsubscribe_response(&response)?,
            Outcome::Completed(Err(err)) if err.is_connection_fatal() => {
                debug!(id = %id, error = %err, "registration went away with its connection");
                false
            }
            Outcome::Completed(Err(err)) => return Err(err),
            Outcome::Interrupted { error, pending } => {
                drop(pending);
                return Err(error);
            }
        };

        debug!(id = %id, %registration_id, removed, "subscription removed");
        Ok(removed)
    }

    /// Unsubscribes everything. Errors are logged and otherwise ignored.
    pub async fn shutdown(&self) {
        let ids: Vec<_> = self.subscriptions.read().await.keys().copied().collect();
        for id in ids {
            if let Err(err) = self.unsubscribe(id).await {
                debug!(id = %id, error = %err, "unsubscribe during shutdown failed");
            }
        }
    }

    /// Returns the state of a subscription, or `None` once it is removed.
    pub async fn state(&self, id: SubscriptionId) -> Option<SubscriptionState> {
        self.subscriptions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.state())
    }

    /// Watches the state of a subscription.
    pub async fn watch_state(&self, id: SubscriptionId) -> Option<watch::Receiver<SubscriptionState>> {
        self.subscriptions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.state.subscribe())
    }

    /// Returns the member-assigned registration id currently backing `id`.
    ///
    /// Waits for an in-flight install or reinstall of the same subscription.
    pub async fn registration_id(&self, id: SubscriptionId) -> Option<Uuid> {
        let entry = self.subscriptions.read().await.get(&id).cloned()?;
        let registration = entry.registration.lock().await;
        registration.registration_id
    }

    /// Returns the number of live subscriptions.
    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Returns `true` if no subscription is live.
    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }

    /// Routes one inbound event message to its subscription.
    ///
    /// Events are matched by the correlation id of the subscribe request
    /// that created the registration, on the connection it was created on.
    /// The route exists from the moment that request is sent, so events the
    /// member pushes before its response arrives are delivered too.
    ///
    /// Dispatch holds no subscription lock, which lets a handler unsubscribe
    /// from inside its callback. A dispatch already under way when
    /// [`unsubscribe`](Self::unsubscribe) runs may still call handlers after
    /// it returns; a dispatch starting later never does.
    pub async fn handle_event(&self, connection: ConnectionId, message: ClientMessage) {
        self.stats.record_message();
        let correlation_id = match message.correlation_id() {
            Ok(correlation_id) => correlation_id,
            Err(err) => {
                self.stats.record_error();
                warn!(connection = %connection, error = %err, "malformed event message");
                return;
            }
        };

        let route = self.routes.read().await.get(&correlation_id).copied();
        let Some(route) = route.filter(|route| route.connection == connection) else {
            trace!(connection = %connection, correlation_id, "event for no live registration");
            return;
        };
        let entry = self.subscriptions.read().await.get(&route.id).cloned();
        let Some(entry) = entry else {
            return;
        };
        if entry.state() == SubscriptionState::Removed {
            trace!(id = %route.id, "event dropped for removed subscription");
            return;
        }

        self.stats.record_dispatch();
        if let Err(err) = entry.handler.handle_event(&message).await {
            self.stats.record_error();
            warn!(id = %route.id, error = %err, "failed to handle event");
        }
    }

    /// Reacts to a connection lifecycle change.
    ///
    /// A new connection reinstalls every subscription that is not registered
    /// on it, including those whose previous reinstall failed.
    pub async fn handle_connection_event(&self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected { id } => self.reinstall_all(id).await,
            ConnectionEvent::Disconnected { id, error } => {
                let mut routes = self.routes.write().await;
                routes.retain(|_, route| route.connection != id);
                debug!(connection = %id, error = ?error, "connection lost; routes dropped");
            }
        }
    }

    /// Spawns a task feeding transport connection events to this manager.
    pub fn spawn_connection_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut events = self.transport.subscribe_connection_events();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => manager.handle_connection_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "missed connection events; reinstalling");
                        if let Some(connection) = manager.transport.current_connection() {
                            manager.reinstall_all(connection).await;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Spawns a task dispatching inbound events one at a time, in arrival order.
    pub fn spawn_event_pump(self: &Arc<Self>, mut events: mpsc::Receiver<InboundEvent>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                manager.handle_event(event.connection, event.message).await;
            }
        })
    }

    async fn reinstall_all(&self, connection: ConnectionId) {
        let entries: Vec<_> = self.subscriptions.read().await.values().cloned().collect();
        if entries.is_empty() {
            return;
        }
        debug!(connection = %connection, count = entries.len(), "reinstalling subscriptions");
        futures::future::join_all(
            entries
                .into_iter()
                .map(|entry| self.reinstall(entry, connection)),
        )
        .await;
    }

    async fn reinstall(&self, entry: Arc<SubscriptionEntry>, connection: ConnectionId) {
        let mut registration = entry.registration.lock().await;
        let state = entry.state();
        if state == SubscriptionState::Removed
            || (state == SubscriptionState::Active && registration.connection == Some(connection))
        {
            return;
        }

        entry.set_state(SubscriptionState::Reinstalling);
        self.drop_route(&mut registration).await;
        let previous = registration.registration_id;

        match self
            .install(&entry, &mut registration, connection, &CancellationToken::new())
            .await
        {
            Ok(()) => {
                entry.set_state(SubscriptionState::Active);
                self.stats.record_reinstall();
                debug!(
                    id = %entry.id,
                    connection = %connection,
                    previous = ?previous,
                    registration_id = ?registration.registration_id,
                    "subscription reinstalled"
                );
                let _ = self.notifications.send(SubscriptionNotification::Reinstalled {
                    id: entry.id,
                    connection,
                });
            }
            Err(err) => {
                entry.set_state(SubscriptionState::Failed);
                self.stats.record_error();
                warn!(id = %entry.id, connection = %connection, error = %err, "subscription reinstall failed");
                let _ = self
                    .notifications
                    .send(SubscriptionNotification::ReinstallFailed {
                        id: entry.id,
                        reason: err.to_string(),
                    });
            }
        }
    }

    /// Sends the retained subscribe request on `connection` and records the
    /// registration it creates. The caller holds the entry lock.
    async fn install(
        &self,
        entry: &SubscriptionEntry,
        registration: &mut Registration,
        connection: ConnectionId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut request = entry.request.clone();
        let correlation_id = next_correlation_id();
        request.set_correlation_id(correlation_id)?;
        self.routes.write().await.insert(
            correlation_id,
            Route {
                id: entry.id,
                connection,
            },
        );

        let registered = match self.round_trip(connection, request, cancel).await {
            Outcome::Completed(response) => {
                response.and_then(|response| entry.handler.decode_subscribe_response(&response))
            }
            Outcome::Interrupted { error, pending } => {
                self.release_abandoned(Arc::clone(&entry.handler), connection, pending);
                Err(error)
            }
        };

        match registered {
            Ok(registration_id) => {
                *registration = Registration {
                    connection: Some(connection),
                    registration_id: Some(registration_id),
                    correlation_id: Some(correlation_id),
                };
                Ok(())
            }
            Err(err) => {
                self.routes.write().await.remove(&correlation_id);
                *registration = Registration::default();
                Err(err)
            }
        }
    }

    async fn drop_route(&self, registration: &mut Registration) {
        if let Some(correlation_id) = registration.correlation_id.take() {
            self.routes.write().await.remove(&correlation_id);
        }
    }

    async fn round_trip(
        &self,
        connection: ConnectionId,
        request: ClientMessage,
        cancel: &CancellationToken,
    ) -> Outcome {
        let transport = Arc::clone(&self.transport);
        let mut pending = tokio::spawn(async move { transport.send(connection, request).await });
        let timeout = self.config.operation_timeout();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Outcome::Interrupted {
                error: HzError::OperationCancelled,
                pending,
            },
            joined = tokio::time::timeout(timeout, &mut pending) => match joined {
                Ok(Ok(response)) => Outcome::Completed(response),
                Ok(Err(join_error)) => Outcome::Completed(Err(HzError::Connection(format!(
                    "request task failed: {join_error}"
                )))),
                Err(_) => Outcome::Interrupted {
                    error: HzError::Timeout(format!("no response within {timeout:?}")),
                    pending,
                },
            },
        }
    }

    /// Removes whatever registration an abandoned subscribe request creates.
    fn release_abandoned(
        &self,
        handler: Arc<dyn SubscriptionHandler>,
        connection: ConnectionId,
        pending: PendingResponse,
    ) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let Ok(Ok(response)) = pending.await else {
                return;
            };
            let Ok(registration_id) = handler.decode_subscribe_response(&response) else {
                return;
            };
            let request = handler
                .encode_unsubscribe_request(registration_id)
                .and_then(|mut request| {
                    request.set_correlation_id(next_correlation_id())?;
                    Ok(request)
                });
            match request {
                Ok(request) => match transport.send(connection, request).await {
                    Ok(_) => debug!(%registration_id, "released abandoned registration"),
                    Err(err) => debug!(%registration_id, error = %err, "could not release abandoned registration"),
                },
                Err(err) => warn!(%registration_id, error = %err, "could not encode release request"),
            }
        });
    }
}

impl fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

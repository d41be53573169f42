//! The transport seam: request round-trips and connection lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use hzwire_core::{ClientMessage, Result};
use tokio::sync::broadcast;

/// Identifies one physical connection to a member.
///
/// A replaced connection always gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A connection was established and authenticated.
    Connected {
        /// The connection identifier.
        id: ConnectionId,
    },
    /// A connection was closed.
    Disconnected {
        /// The connection identifier.
        id: ConnectionId,
        /// The error that caused disconnection, if any.
        error: Option<String>,
    },
}

/// An event message received on a connection.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// The connection the event arrived on.
    pub connection: ConnectionId,
    /// The event message.
    pub message: ClientMessage,
}

/// Delivers requests to the cluster and reports connection changes.
///
/// Implementations own the sockets. Inbound messages flagged as events are
/// not answered through [`Transport::send`]; the transport forwards them to
/// the subscription manager instead, keyed by the connection they arrived on.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Returns the connection new requests should use, if any is open.
    fn current_connection(&self) -> Option<ConnectionId>;

    /// Sends `request` on `connection` and awaits its response.
    ///
    /// The transport assigns nothing: the request already carries its
    /// correlation id.
    async fn send(&self, connection: ConnectionId, request: ClientMessage) -> Result<ClientMessage>;

    /// Subscribes to connection lifecycle notifications.
    fn subscribe_connection_events(&self) -> broadcast::Receiver<ConnectionEvent>;
}

//! Long-lived server-push subscriptions that survive reconnects.
//!
//! A subscription is installed on one connection by replaying the request
//! its [`SubscriptionHandler`] encoded once at creation. When the transport
//! reports a new connection, the manager replays that request again and
//! keeps the caller-visible [`SubscriptionId`] while the member-assigned
//! registration id changes underneath.

use std::fmt;

use async_trait::async_trait;
use hzwire_core::{ClientMessage, HzError, Result};
use uuid::Uuid;

use crate::transport::ConnectionId;

mod manager;

pub use manager::SubscriptionManager;

/// Caller-visible identifier of a subscription.
///
/// Stable for the subscription's lifetime, across any number of reinstalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a new unique subscription ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a subscription ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// Lifecycle state of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    /// Created, no request sent yet.
    Created,
    /// The first subscribe round-trip is in flight.
    Installing,
    /// Registered on a live connection; events are delivered.
    Active,
    /// Being registered again on a replacement connection.
    Reinstalling,
    /// The last reinstall failed. The next connection retries it.
    Failed,
    /// Unsubscribed or abandoned. Terminal.
    Removed,
}

impl SubscriptionState {
    /// Returns `true` if events are delivered in this state.
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Subscription state changes reported outside any request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionNotification {
    /// The subscription was registered again on a new connection.
    Reinstalled {
        /// The caller-visible id.
        id: SubscriptionId,
        /// The connection it is now registered on.
        connection: ConnectionId,
    },
    /// Registering on a new connection failed; the subscription is `Failed`.
    ReinstallFailed {
        /// The caller-visible id.
        id: SubscriptionId,
        /// Why the subscribe request failed.
        reason: String,
    },
    /// The subscription was removed.
    Removed {
        /// The caller-visible id.
        id: SubscriptionId,
    },
}

impl SubscriptionNotification {
    /// Returns the subscription this notification is about.
    pub fn id(&self) -> SubscriptionId {
        match self {
            Self::Reinstalled { id, .. } | Self::ReinstallFailed { id, .. } | Self::Removed { id } => {
                *id
            }
        }
    }

    /// Returns the failure as an error, for reinstall failures.
    pub fn error(&self) -> Option<HzError> {
        match self {
            Self::ReinstallFailed { id, reason } => Some(HzError::SubscriptionReinstallFailed {
                id: id.as_uuid(),
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}

/// The codecs and event sink of one subscription.
///
/// The subscribe request is encoded once, when the subscription is created,
/// and replayed with a fresh correlation id on every (re)install.
#[async_trait]
pub trait SubscriptionHandler: Send + Sync + 'static {
    /// Encodes the subscribe request.
    fn encode_subscribe_request(&self) -> Result<ClientMessage>;

    /// Decodes the member-assigned registration id from the subscribe response.
    fn decode_subscribe_response(&self, response: &ClientMessage) -> Result<Uuid>;

    /// Encodes the request removing registration `registration_id`.
    fn encode_unsubscribe_request(&self, registration_id: Uuid) -> Result<ClientMessage>;

    /// Decodes whether the member still had the registration.
    fn decode_unsubscribe_response(&self, response: &ClientMessage) -> Result<bool>;

    /// Decodes and dispatches one event message.
    async fn handle_event(&self, event: &ClientMessage) -> Result<()>;
}

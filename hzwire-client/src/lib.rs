//! Client-side session layer for the cluster wire protocol.
//!
//! This crate sits between a transport that owns the sockets and the typed
//! facades an application uses. It authenticates connections, negotiates the
//! serialization version, and keeps server-push event subscriptions alive
//! across reconnects.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hzwire_client::{ClientConfig, MapEvents, SubscriptionManager};
//!
//! let config = ClientConfig::builder().cluster_name("dev").build()?;
//! let manager = Arc::new(SubscriptionManager::new(transport.clone(), config.subscription().clone()));
//! manager.spawn_connection_listener();
//! manager.spawn_event_pump(inbound_events);
//!
//! let orders = MapEvents::<String, i64>::new("orders", manager, serialization, members, &config);
//! let id = orders
//!     .subscribe(|handlers| {
//!         handlers.on_added(|event| async move {
//!             println!("added {:?}", event.key.get());
//!         })
//!     })
//!     .await?;
//! // `id` stays valid when the connection is replaced
//! orders.unsubscribe(id).await?;
//! ```
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`ClientConfig`] and [`SubscriptionConfig`] builders |
//! | [`transport`] | The [`Transport`] seam and connection events |
//! | [`handshake`] | Authentication and serialization-version negotiation |
//! | [`subscription`] | The [`SubscriptionManager`] |
//! | [`listener`] | Event types, lazy event fields, handler sets |
//! | [`proxy`] | [`MapEvents`], entry subscriptions of one map |
//! | [`cluster`] | [`Member`] and member lookup for event sources |
//! | [`statistics`] | Client statistics reports |

#![warn(missing_docs)]

pub mod cluster;
pub mod config;
pub mod handshake;
pub mod listener;
pub mod proxy;
pub mod statistics;
pub mod subscription;
pub mod transport;

pub use cluster::{Member, MemberDirectory, StaticMemberDirectory};
pub use config::{
    ClientConfig, ClientConfigBuilder, ConfigError, SubscriptionConfig, SubscriptionConfigBuilder,
};
pub use handshake::{authenticate, AuthenticatedMember, AuthenticationStatus};
pub use hzwire_core as core;
pub use listener::{
    EntryEvent, EntryEventType, EntryHandler, EntryHandlers, LazyValue, ListenerStats, MapEvent,
};
pub use proxy::{MapEvents, SubscriptionMode};
pub use statistics::StatisticsBuilder;
pub use subscription::{
    SubscriptionHandler, SubscriptionId, SubscriptionManager, SubscriptionNotification,
    SubscriptionState,
};
pub use transport::{ConnectionEvent, ConnectionId, InboundEvent, Transport};

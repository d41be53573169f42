//! Error types for protocol, serialization and subscription operations.

use std::io;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for client protocol operations.
#[derive(Debug, Error)]
pub enum HzError {
    /// A frame or message is malformed or truncated.
    ///
    /// Fatal to the connection that produced it.
    #[error("framing error: {0}")]
    Framing(String),

    /// No serializer is registered for an incoming type id.
    ///
    /// The response carrying the value is considered corrupt.
    #[error("unknown serialization type id: {0}")]
    UnknownType(i32),

    /// A serializer with the same type id is already registered.
    #[error("duplicate serializer type id: {0}")]
    DuplicateTypeId(i32),

    /// A value does not match the shape its serializer expects.
    #[error("serialization type mismatch: expected {expected}, got {actual}")]
    SerializationType {
        /// The type the serializer handles.
        expected: &'static str,
        /// The type that was supplied or requested.
        actual: &'static str,
    },

    /// The serialization format version negotiated with a member differs from ours.
    #[error("serialization version mismatch: client {client}, server {server}")]
    SerializationVersionMismatch {
        /// The version this client writes.
        client: u8,
        /// The version reported by the member.
        server: u8,
    },

    /// API misuse, such as appending to an already sealed message.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The caller cancelled the operation before the round-trip completed.
    #[error("operation cancelled")]
    OperationCancelled,

    /// A subscription could not be re-installed after a connection was replaced.
    #[error("failed to reinstall subscription {id}: {reason}")]
    SubscriptionReinstallFailed {
        /// The caller-visible subscription id.
        id: Uuid,
        /// Why the re-subscribe request failed.
        reason: String,
    },

    /// Serialization/deserialization errors inside a payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Connection-related errors (network failures, disconnections).
    #[error("connection error: {0}")]
    Connection(String),

    /// Operation timeout errors.
    #[error("timeout error: {0}")]
    Timeout(String),

    /// Authentication errors (invalid credentials, rejected client).
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Configuration errors (invalid settings).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HzError {
    /// Returns `true` if this error invalidates the connection it occurred on.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            Self::Framing(_)
                | Self::UnknownType(_)
                | Self::SerializationVersionMismatch { .. }
                | Self::Connection(_)
                | Self::Io(_)
        )
    }

    pub(crate) fn short_frame(what: &str, needed: usize, available: usize) -> Self {
        Self::Framing(format!(
            "{what}: need {needed} bytes, frame has {available}"
        ))
    }
}

/// A specialized `Result` type for client protocol operations.
pub type Result<T> = std::result::Result<T, HzError>;

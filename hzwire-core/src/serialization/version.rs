//! Serialization format version, negotiated once per connection.

use std::sync::{Arc, OnceLock};

use super::{Data, SerializerRegistry};
use crate::error::{HzError, Result};

/// The serialization format version this client writes and reads.
pub const SERIALIZATION_VERSION: u8 = 1;

/// A registry bound to the serialization version a connection negotiated.
///
/// The registry itself is version-agnostic; this wrapper refuses to decode
/// typed payloads until the authentication response has supplied the
/// member's version, and records the version exactly once.
#[derive(Debug)]
pub struct NegotiatedSerialization {
    registry: Arc<SerializerRegistry>,
    version: OnceLock<u8>,
}

impl NegotiatedSerialization {
    /// Wraps a shared registry; no version is negotiated yet.
    pub fn new(registry: Arc<SerializerRegistry>) -> Self {
        Self {
            registry,
            version: OnceLock::new(),
        }
    }

    /// Records the version a member reported during authentication.
    ///
    /// A version other than [`SERIALIZATION_VERSION`] fails with
    /// [`HzError::SerializationVersionMismatch`]; the connection must be dropped.
    pub fn negotiate(&self, server_version: u8) -> Result<()> {
        if server_version != SERIALIZATION_VERSION {
            return Err(HzError::SerializationVersionMismatch {
                client: SERIALIZATION_VERSION,
                server: server_version,
            });
        }
        let stored = *self.version.get_or_init(|| server_version);
        if stored != server_version {
            return Err(HzError::Protocol(format!(
                "serialization version already negotiated as {stored}"
            )));
        }
        Ok(())
    }

    /// Returns the negotiated version, if authentication has completed.
    pub fn version(&self) -> Option<u8> {
        self.version.get().copied()
    }

    /// Returns the registry once a version has been negotiated.
    pub fn registry(&self) -> Result<&Arc<SerializerRegistry>> {
        match self.version.get() {
            Some(_) => Ok(&self.registry),
            None => Err(HzError::Protocol(
                "typed payload decoded before serialization version negotiation".to_string(),
            )),
        }
    }

    /// Deserializes `data` through the negotiated registry.
    pub fn to_object<T: std::any::Any>(&self, data: &Data) -> Result<T> {
        self.registry()?.to_object(data)
    }
}

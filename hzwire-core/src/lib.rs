//! Wire protocol core for the cluster client.
//!
//! - [`protocol`]: frames, messages, the framing codec and codec primitives
//! - [`serialization`]: the serializer registry and the portable [`Data`] form
//! - [`codecs`]: the operation codecs built from both

#![warn(missing_docs)]

pub mod codecs;
pub mod error;
pub mod protocol;
pub mod serialization;

pub use error::{HzError, Result};
pub use protocol::{ClientMessage, ClientMessageCodec, Frame, FrameIterator};
pub use serialization::{
    Data, DataInput, DataOutput, NegotiatedSerialization, ObjectDataInput, ObjectDataOutput,
    SerializerRegistry, SerializerRegistryBuilder, StreamSerializer,
};

//! Serialization between typed values and the portable [`Data`] form.

mod data;
mod data_input;
mod data_output;
mod registry;
mod serializer;
mod version;

pub use data::{Data, DATA_OFFSET, PARTITION_HASH_OFFSET, TYPE_OFFSET};
pub use data_input::{DataInput, ObjectDataInput};
pub use data_output::{DataOutput, ObjectDataOutput};
pub use registry::{SerializerRegistry, SerializerRegistryBuilder};
pub use serializer::{
    BooleanSerializer, ByteArraySerializer, ByteSerializer, DoubleSerializer, FloatSerializer,
    IntegerSerializer, LongSerializer, SerializerAdapter, ShortSerializer, StreamSerializer,
    StreamSerializerAdapter, StringSerializer, UuidSerializer, BOOLEAN_TYPE_ID,
    BYTE_ARRAY_TYPE_ID, BYTE_TYPE_ID, DOUBLE_TYPE_ID, FLOAT_TYPE_ID, INTEGER_TYPE_ID,
    LONG_TYPE_ID, SHORT_TYPE_ID, STRING_TYPE_ID, UUID_TYPE_ID,
};
pub use version::{NegotiatedSerialization, SERIALIZATION_VERSION};

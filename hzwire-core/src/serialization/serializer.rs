//! Serializer contracts and the adapter that erases their value type.

use std::any::{Any, TypeId};
use std::fmt;

use uuid::Uuid;

use super::{DataInput, DataOutput, ObjectDataInput, ObjectDataOutput};
use crate::error::{HzError, Result};

/// A user-supplied serializer for values of one concrete type.
///
/// Implementations must be value-comparable so that registering the same
/// logical serializer twice is recognised as a no-op.
pub trait StreamSerializer: PartialEq + Send + Sync + 'static {
    /// The type of values this serializer reads and writes.
    type Value: Any + Send + Sync;

    /// The stable type id written into every blob this serializer produces.
    fn serializer_id(&self) -> i32;

    /// Writes `value` into `output`.
    fn write(&self, output: &mut ObjectDataOutput, value: &Self::Value) -> Result<()>;

    /// Reads a value back from `input`.
    fn read(&self, input: &mut ObjectDataInput<'_>) -> Result<Self::Value>;

    /// Releases resources held by the serializer. Called once on registry shutdown.
    fn destroy(&self) {}
}

/// A serializer seen through its untyped capability set.
///
/// Built-in and user serializers are both stored behind this trait, so the
/// registry treats them identically.
pub trait SerializerAdapter: Send + Sync {
    /// The stable type id of the wrapped serializer.
    fn serializer_id(&self) -> i32;

    /// Writes a value, failing with [`HzError::SerializationType`] if it is
    /// not of the serializer's value type.
    fn write(&self, output: &mut ObjectDataOutput, value: &dyn Any) -> Result<()>;

    /// Reads a value as an untyped box.
    fn read(&self, input: &mut ObjectDataInput<'_>) -> Result<Box<dyn Any + Send + Sync>>;

    /// Invokes the wrapped serializer's shutdown hook.
    fn destroy(&self);

    /// The wrapped serializer instance.
    fn underlying(&self) -> &dyn Any;

    /// The Rust type of the values this serializer handles.
    fn value_type(&self) -> TypeId;

    /// Human-readable name of the value type, for diagnostics.
    fn value_type_name(&self) -> &'static str;

    /// Value equality of the wrapped serializers.
    fn dyn_eq(&self, other: &dyn SerializerAdapter) -> bool;
}

impl PartialEq for dyn SerializerAdapter {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl fmt::Debug for dyn SerializerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerAdapter")
            .field("serializer_id", &self.serializer_id())
            .field("value_type", &self.value_type_name())
            .finish()
    }
}

/// Wraps a [`StreamSerializer`] behind [`SerializerAdapter`].
///
/// The downcast from `&dyn Any` to the serializer's value type happens here
/// and nowhere else.
pub struct StreamSerializerAdapter<S> {
    serializer: S,
}

impl<S: StreamSerializer> StreamSerializerAdapter<S> {
    /// Wraps `serializer`.
    pub fn new(serializer: S) -> Self {
        Self { serializer }
    }

    /// Returns the wrapped serializer.
    pub fn serializer(&self) -> &S {
        &self.serializer
    }
}

impl<S: StreamSerializer> SerializerAdapter for StreamSerializerAdapter<S> {
    fn serializer_id(&self) -> i32 {
        self.serializer.serializer_id()
    }

    fn write(&self, output: &mut ObjectDataOutput, value: &dyn Any) -> Result<()> {
        let value = value
            .downcast_ref::<S::Value>()
            .ok_or(HzError::SerializationType {
                expected: std::any::type_name::<S::Value>(),
                actual: "a value of another type",
            })?;
        self.serializer.write(output, value)
    }

    fn read(&self, input: &mut ObjectDataInput<'_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = self.serializer.read(input)?;
        Ok(Box::new(value))
    }

    fn destroy(&self) {
        self.serializer.destroy();
    }

    fn underlying(&self) -> &dyn Any {
        &self.serializer
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<S::Value>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<S::Value>()
    }

    fn dyn_eq(&self, other: &dyn SerializerAdapter) -> bool {
        other.value_type() == self.value_type()
            && other
                .underlying()
                .downcast_ref::<S>()
                .is_some_and(|theirs| *theirs == self.serializer)
    }
}

// Type ids of the built-in serializers, shared with every cluster member.

/// Type id of `i8` values.
pub const BYTE_TYPE_ID: i32 = -3;
/// Type id of `bool` values.
pub const BOOLEAN_TYPE_ID: i32 = -4;
/// Type id of `i16` values.
pub const SHORT_TYPE_ID: i32 = -6;
/// Type id of `i32` values.
pub const INTEGER_TYPE_ID: i32 = -7;
/// Type id of `i64` values.
pub const LONG_TYPE_ID: i32 = -8;
/// Type id of `f32` values.
pub const FLOAT_TYPE_ID: i32 = -9;
/// Type id of `f64` values.
pub const DOUBLE_TYPE_ID: i32 = -10;
/// Type id of `String` values.
pub const STRING_TYPE_ID: i32 = -11;
/// Type id of `Vec<u8>` values.
pub const BYTE_ARRAY_TYPE_ID: i32 = -12;
/// Type id of `Uuid` values.
pub const UUID_TYPE_ID: i32 = -21;

macro_rules! builtin_serializer {
    ($name:ident, $ty:ty, $id:expr, |$out:ident, $value:ident| $write:expr, $read:ident) => {
        #[doc = concat!("Built-in serializer for `", stringify!($ty), "`.")]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl StreamSerializer for $name {
            type Value = $ty;

            fn serializer_id(&self) -> i32 {
                $id
            }

            fn write(&self, $out: &mut ObjectDataOutput, $value: &$ty) -> Result<()> {
                $write
            }

            fn read(&self, input: &mut ObjectDataInput<'_>) -> Result<$ty> {
                input.$read()
            }
        }
    };
}

builtin_serializer!(ByteSerializer, i8, BYTE_TYPE_ID, |out, v| out.write_byte(*v), read_byte);
builtin_serializer!(BooleanSerializer, bool, BOOLEAN_TYPE_ID, |out, v| out.write_bool(*v), read_bool);
builtin_serializer!(ShortSerializer, i16, SHORT_TYPE_ID, |out, v| out.write_short(*v), read_short);
builtin_serializer!(IntegerSerializer, i32, INTEGER_TYPE_ID, |out, v| out.write_int(*v), read_int);
builtin_serializer!(LongSerializer, i64, LONG_TYPE_ID, |out, v| out.write_long(*v), read_long);
builtin_serializer!(FloatSerializer, f32, FLOAT_TYPE_ID, |out, v| out.write_float(*v), read_float);
builtin_serializer!(DoubleSerializer, f64, DOUBLE_TYPE_ID, |out, v| out.write_double(*v), read_double);
builtin_serializer!(StringSerializer, String, STRING_TYPE_ID, |out, v| out.write_string(v), read_string);
builtin_serializer!(ByteArraySerializer, Vec<u8>, BYTE_ARRAY_TYPE_ID, |out, v| out.write_byte_array(v), read_byte_array);
builtin_serializer!(UuidSerializer, Uuid, UUID_TYPE_ID, |out, v| out.write_uuid(v), read_uuid);

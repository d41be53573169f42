//! Data output used by serializers to build `Data` payloads.

use bytes::{BufMut, BytesMut};
use uuid::Uuid;

use crate::error::{HzError, Result};

/// Trait for writing primitive values of a serialized payload.
///
/// All multi-byte values are written in big-endian byte order.
pub trait DataOutput {
    /// Writes a single byte (i8).
    fn write_byte(&mut self, v: i8) -> Result<()>;

    /// Writes a boolean as a single byte (0 for false, 1 for true).
    fn write_bool(&mut self, v: bool) -> Result<()>;

    /// Writes a 16-bit signed integer.
    fn write_short(&mut self, v: i16) -> Result<()>;

    /// Writes a 32-bit signed integer.
    fn write_int(&mut self, v: i32) -> Result<()>;

    /// Writes a 64-bit signed integer.
    fn write_long(&mut self, v: i64) -> Result<()>;

    /// Writes a 32-bit floating point.
    fn write_float(&mut self, v: f32) -> Result<()>;

    /// Writes a 64-bit floating point.
    fn write_double(&mut self, v: f64) -> Result<()>;

    /// Writes raw bytes without length prefix.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;

    /// Writes a byte array with an int32 length prefix.
    fn write_byte_array(&mut self, v: &[u8]) -> Result<()> {
        self.write_int(length_prefix(v.len())?)?;
        self.write_bytes(v)
    }

    /// Writes a UTF-8 string with an int32 byte-length prefix.
    fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_byte_array(v.as_bytes())
    }

    /// Writes a uuid as its most and least significant halves.
    fn write_uuid(&mut self, v: &Uuid) -> Result<()> {
        let (msb, lsb) = v.as_u64_pair();
        self.write_long(msb as i64)?;
        self.write_long(lsb as i64)
    }
}

fn length_prefix(len: usize) -> Result<i32> {
    i32::try_from(len)
        .map_err(|_| HzError::Serialization(format!("length {len} exceeds int32 range")))
}

/// A growable buffer implementing [`DataOutput`].
#[derive(Debug)]
pub struct ObjectDataOutput {
    buffer: BytesMut,
}

impl ObjectDataOutput {
    /// Creates an empty output with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates an empty output with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the written bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the output and returns the written buffer.
    pub fn into_buffer(self) -> BytesMut {
        self.buffer
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ObjectDataOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl DataOutput for ObjectDataOutput {
    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.buffer.put_i8(v);
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.buffer.put_u8(u8::from(v));
        Ok(())
    }

    fn write_short(&mut self, v: i16) -> Result<()> {
        self.buffer.put_i16(v);
        Ok(())
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        self.buffer.put_i32(v);
        Ok(())
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        self.buffer.put_i64(v);
        Ok(())
    }

    fn write_float(&mut self, v: f32) -> Result<()> {
        self.buffer.put_f32(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.buffer.put_f64(v);
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.buffer.put_slice(v);
        Ok(())
    }
}

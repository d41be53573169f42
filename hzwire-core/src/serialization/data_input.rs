//! Data input used by serializers to read `Data` payloads.

use bytes::Buf;
use uuid::Uuid;

use crate::error::{HzError, Result};

/// Trait for reading primitive values of a serialized payload.
///
/// All multi-byte values are read in big-endian byte order. Running out of
/// input is an error; no value is ever defaulted.
pub trait DataInput {
    /// Reads a single byte (i8).
    fn read_byte(&mut self) -> Result<i8>;

    /// Reads a boolean from a single byte.
    fn read_bool(&mut self) -> Result<bool>;

    /// Reads a 16-bit signed integer.
    fn read_short(&mut self) -> Result<i16>;

    /// Reads a 32-bit signed integer.
    fn read_int(&mut self) -> Result<i32>;

    /// Reads a 64-bit signed integer.
    fn read_long(&mut self) -> Result<i64>;

    /// Reads a 32-bit floating point.
    fn read_float(&mut self) -> Result<f32>;

    /// Reads a 64-bit floating point.
    fn read_double(&mut self) -> Result<f64>;

    /// Reads the specified number of raw bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Reads an int32 length-prefixed byte array.
    fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        let len = self.read_int()?;
        let len = usize::try_from(len)
            .map_err(|_| HzError::Serialization(format!("invalid array length: {len}")))?;
        self.read_bytes(len)
    }

    /// Reads a length-prefixed UTF-8 string.
    fn read_string(&mut self) -> Result<String> {
        String::from_utf8(self.read_byte_array()?)
            .map_err(|e| HzError::Serialization(format!("invalid UTF-8 string: {e}")))
    }

    /// Reads a uuid written as two int64 halves.
    fn read_uuid(&mut self) -> Result<Uuid> {
        let msb = self.read_long()? as u64;
        let lsb = self.read_long()? as u64;
        Ok(Uuid::from_u64_pair(msb, lsb))
    }
}

/// A slice-backed implementation of [`DataInput`].
#[derive(Debug)]
pub struct ObjectDataInput<'a> {
    remaining: &'a [u8],
    position: usize,
}

impl<'a> ObjectDataInput<'a> {
    /// Creates a new input over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            remaining: data,
            position: 0,
        }
    }

    /// Returns the number of bytes remaining to be read.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Returns the number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.remaining.len() < n {
            return Err(HzError::Serialization(format!(
                "insufficient data: need {} bytes, have {}",
                n,
                self.remaining.len()
            )));
        }
        Ok(())
    }

    fn consumed(&mut self, n: usize) {
        self.position += n;
    }
}

impl DataInput for ObjectDataInput<'_> {
    fn read_byte(&mut self) -> Result<i8> {
        self.ensure_remaining(1)?;
        self.consumed(1);
        Ok(self.remaining.get_i8())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.read_byte().map(|b| b != 0)
    }

    fn read_short(&mut self) -> Result<i16> {
        self.ensure_remaining(2)?;
        self.consumed(2);
        Ok(self.remaining.get_i16())
    }

    fn read_int(&mut self) -> Result<i32> {
        self.ensure_remaining(4)?;
        self.consumed(4);
        Ok(self.remaining.get_i32())
    }

    fn read_long(&mut self) -> Result<i64> {
        self.ensure_remaining(8)?;
        self.consumed(8);
        Ok(self.remaining.get_i64())
    }

    fn read_float(&mut self) -> Result<f32> {
        self.ensure_remaining(4)?;
        self.consumed(4);
        Ok(self.remaining.get_f32())
    }

    fn read_double(&mut self) -> Result<f64> {
        self.ensure_remaining(8)?;
        self.consumed(8);
        Ok(self.remaining.get_f64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure_remaining(len)?;
        let (head, tail) = self.remaining.split_at(len);
        self.remaining = tail;
        self.consumed(len);
        Ok(head.to_vec())
    }
}

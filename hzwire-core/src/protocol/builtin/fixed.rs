//! Fixed-size field codec.
//!
//! Reads and writes scalars at known offsets of a frame's bytes. All
//! multi-byte values are little-endian. Out-of-range offsets are framing
//! errors, never silently defaulted.

use uuid::Uuid;

use crate::error::{HzError, Result};
use crate::protocol::constants::{BOOL_SIZE, BYTE_SIZE, GUID_SIZE, INT_SIZE, LONG_SIZE};

fn field<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let end = offset
        .checked_add(N)
        .ok_or_else(|| HzError::Framing(format!("field offset {offset} overflows")))?;
    let slice = bytes
        .get(offset..end)
        .ok_or_else(|| HzError::short_frame("fixed-size field", end, bytes.len()))?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn field_mut(bytes: &mut [u8], offset: usize, width: usize) -> Result<&mut [u8]> {
    let len = bytes.len();
    let end = offset
        .checked_add(width)
        .ok_or_else(|| HzError::Framing(format!("field offset {offset} overflows")))?;
    bytes
        .get_mut(offset..end)
        .ok_or_else(|| HzError::short_frame("fixed-size field", end, len))
}

/// Writes an int32 at `offset`.
pub fn encode_int(bytes: &mut [u8], offset: usize, value: i32) -> Result<()> {
    field_mut(bytes, offset, INT_SIZE)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Reads an int32 at `offset`.
pub fn decode_int(bytes: &[u8], offset: usize) -> Result<i32> {
    field::<INT_SIZE>(bytes, offset).map(i32::from_le_bytes)
}

/// Writes an int64 at `offset`.
pub fn encode_long(bytes: &mut [u8], offset: usize, value: i64) -> Result<()> {
    field_mut(bytes, offset, LONG_SIZE)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Reads an int64 at `offset`.
pub fn decode_long(bytes: &[u8], offset: usize) -> Result<i64> {
    field::<LONG_SIZE>(bytes, offset).map(i64::from_le_bytes)
}

/// Writes a byte at `offset`.
pub fn encode_byte(bytes: &mut [u8], offset: usize, value: u8) -> Result<()> {
    field_mut(bytes, offset, BYTE_SIZE)?.copy_from_slice(&[value]);
    Ok(())
}

/// Reads a byte at `offset`.
pub fn decode_byte(bytes: &[u8], offset: usize) -> Result<u8> {
    field::<BYTE_SIZE>(bytes, offset).map(|[b]| b)
}

/// Writes a boolean at `offset` as a single byte.
pub fn encode_bool(bytes: &mut [u8], offset: usize, value: bool) -> Result<()> {
    encode_byte(bytes, offset, u8::from(value))
}

/// Reads a boolean at `offset`; any non-zero byte is `true`.
pub fn decode_bool(bytes: &[u8], offset: usize) -> Result<bool> {
    field::<BOOL_SIZE>(bytes, offset).map(|[b]| b != 0)
}

/// Writes a nullable guid at `offset`.
///
/// Layout: null flag byte, most significant half (int64), least significant half (int64).
pub fn encode_guid(bytes: &mut [u8], offset: usize, value: Option<Uuid>) -> Result<()> {
    let slot = field_mut(bytes, offset, GUID_SIZE)?;
    slot.fill(0);
    match value {
        None => {
            slot[0] = 1;
        }
        Some(uuid) => {
            let (msb, lsb) = uuid.as_u64_pair();
            slot[BOOL_SIZE..BOOL_SIZE + LONG_SIZE].copy_from_slice(&(msb as i64).to_le_bytes());
            slot[BOOL_SIZE + LONG_SIZE..].copy_from_slice(&(lsb as i64).to_le_bytes());
        }
    }
    Ok(())
}

/// Reads a nullable guid at `offset`.
pub fn decode_guid(bytes: &[u8], offset: usize) -> Result<Option<Uuid>> {
    let raw = field::<GUID_SIZE>(bytes, offset)?;
    if raw[0] != 0 {
        return Ok(None);
    }
    let msb = decode_long(&raw, BOOL_SIZE)? as u64;
    let lsb = decode_long(&raw, BOOL_SIZE + LONG_SIZE)? as u64;
    Ok(Some(Uuid::from_u64_pair(msb, lsb)))
}

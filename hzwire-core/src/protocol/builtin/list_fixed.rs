//! Packed lists of fixed-size elements, carried in a single frame.

use uuid::Uuid;

use super::fixed;
use crate::error::{HzError, Result};
use crate::protocol::constants::{GUID_SIZE, INT_SIZE, LONG_SIZE};
use crate::protocol::{ClientMessage, Frame, FrameIterator};

fn encode_packed<T: Copy>(
    message: &mut ClientMessage,
    items: &[T],
    width: usize,
    write: fn(&mut [u8], usize, T) -> Result<()>,
) -> Result<()> {
    let mut frame = Frame::zeroed(items.len() * width, 0);
    for (index, item) in items.iter().enumerate() {
        write(&mut frame.content, index * width, *item)?;
    }
    message.append(frame)
}

fn decode_packed<T>(
    iter: &mut FrameIterator<'_>,
    width: usize,
    read: fn(&[u8], usize) -> Result<T>,
) -> Result<Vec<T>> {
    let frame = iter.take()?;
    if frame.content.len() % width != 0 {
        return Err(HzError::Framing(format!(
            "packed list of {}-byte items has {} bytes",
            width,
            frame.content.len()
        )));
    }
    (0..frame.content.len() / width)
        .map(|index| read(&frame.content, index * width))
        .collect()
}

/// Encodes int32 values packed into one frame.
pub fn encode_int_list(message: &mut ClientMessage, items: &[i32]) -> Result<()> {
    encode_packed(message, items, INT_SIZE, fixed::encode_int)
}

/// Decodes a packed int32 list.
pub fn decode_int_list(iter: &mut FrameIterator<'_>) -> Result<Vec<i32>> {
    decode_packed(iter, INT_SIZE, fixed::decode_int)
}

/// Encodes int64 values packed into one frame.
pub fn encode_long_list(message: &mut ClientMessage, items: &[i64]) -> Result<()> {
    encode_packed(message, items, LONG_SIZE, fixed::encode_long)
}

/// Decodes a packed int64 list.
pub fn decode_long_list(iter: &mut FrameIterator<'_>) -> Result<Vec<i64>> {
    decode_packed(iter, LONG_SIZE, fixed::decode_long)
}

/// Encodes guids packed into one frame.
pub fn encode_uuid_list(message: &mut ClientMessage, items: &[Uuid]) -> Result<()> {
    let mut frame = Frame::zeroed(items.len() * GUID_SIZE, 0);
    for (index, item) in items.iter().enumerate() {
        fixed::encode_guid(&mut frame.content, index * GUID_SIZE, Some(*item))?;
    }
    message.append(frame)
}

/// Decodes a packed guid list; null entries are rejected.
pub fn decode_uuid_list(iter: &mut FrameIterator<'_>) -> Result<Vec<Uuid>> {
    decode_packed(iter, GUID_SIZE, |bytes, offset| {
        fixed::decode_guid(bytes, offset)?
            .ok_or_else(|| HzError::Framing("null entry in guid list".to_string()))
    })
}

//! Nullable wrapper around any other codec.
//!
//! An absent value is a single zero-length frame carrying the null flag, so
//! both branches consume exactly one logical unit of the stream.

use crate::error::Result;
use crate::protocol::{ClientMessage, Frame, FrameIterator};

/// Encodes `value` with `encoder`, or a null frame when absent.
pub fn encode<T, F>(message: &mut ClientMessage, value: Option<T>, encoder: F) -> Result<()>
where
    F: FnOnce(&mut ClientMessage, T) -> Result<()>,
{
    match value {
        Some(value) => encoder(message, value),
        None => message.append(Frame::new_null_frame()),
    }
}

/// Decodes an optional value: a null frame yields `None`, anything else is
/// handed to `decoder`.
pub fn decode<T, F>(iter: &mut FrameIterator<'_>, decoder: F) -> Result<Option<T>>
where
    F: FnOnce(&mut FrameIterator<'_>) -> Result<T>,
{
    if iter.peek().is_some_and(Frame::is_null_frame) {
        iter.skip()?;
        return Ok(None);
    }
    decoder(iter).map(Some)
}

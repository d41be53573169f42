//! Multi-frame list codec.
//!
//! A list is bracketed by begin and end data-structure frames, with each
//! element encoded in between by the element codec.

use crate::error::{HzError, Result};
use crate::protocol::{ClientMessage, Frame, FrameIterator};

/// Encodes every item between a begin and an end frame.
pub fn encode<T, I, F>(message: &mut ClientMessage, items: I, mut encoder: F) -> Result<()>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&mut ClientMessage, T) -> Result<()>,
{
    message.append(Frame::new_begin_frame())?;
    for item in items {
        encoder(message, item)?;
    }
    message.append(Frame::new_end_frame())
}

/// Decodes elements until the matching end frame.
///
/// A missing begin frame or a stream that runs out before the end frame is a
/// framing error.
pub fn decode<T, F>(iter: &mut FrameIterator<'_>, mut decoder: F) -> Result<Vec<T>>
where
    F: FnMut(&mut FrameIterator<'_>) -> Result<T>,
{
    let begin = iter.take()?;
    if !begin.is_begin_frame() {
        return Err(HzError::Framing(format!(
            "expected list begin frame, found flags {:#06x}",
            begin.flags
        )));
    }

    let mut items = Vec::new();
    while !iter.next_is_end_frame() {
        if !iter.has_next() {
            return Err(HzError::Framing("list is missing its end frame".to_string()));
        }
        items.push(decoder(iter)?);
    }
    iter.skip()?;
    Ok(items)
}

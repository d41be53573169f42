//! Variable-size codecs: each value travels as one standalone frame.

use crate::error::{HzError, Result};
use crate::protocol::{ClientMessage, Frame, FrameIterator};

/// Takes the next frame and rejects structural frames where a value is expected.
fn take_value_frame<'a>(iter: &mut FrameIterator<'a>, what: &str) -> Result<&'a Frame> {
    let frame = iter.take()?;
    if frame.is_null_frame() || frame.is_begin_frame() || frame.is_end_frame() {
        return Err(HzError::Framing(format!(
            "expected {what} frame, found structural frame with flags {:#06x}",
            frame.flags
        )));
    }
    Ok(frame)
}

/// UTF-8 string codec.
pub mod string {
    use super::*;

    /// Appends `value` as a frame of UTF-8 bytes.
    pub fn encode(message: &mut ClientMessage, value: &str) -> Result<()> {
        message.append(Frame::from_slice(value.as_bytes()))
    }

    /// Decodes the next frame as a UTF-8 string.
    pub fn decode(iter: &mut FrameIterator<'_>) -> Result<String> {
        let frame = take_value_frame(iter, "string")?;
        String::from_utf8(frame.content.to_vec())
            .map_err(|e| HzError::Framing(format!("invalid UTF-8 in string frame: {e}")))
    }
}

/// Raw byte array codec.
pub mod byte_array {
    use super::*;

    /// Appends `value` as a frame holding the raw bytes.
    pub fn encode(message: &mut ClientMessage, value: &[u8]) -> Result<()> {
        message.append(Frame::from_slice(value))
    }

    /// Decodes the next frame's full payload.
    pub fn decode(iter: &mut FrameIterator<'_>) -> Result<Vec<u8>> {
        take_value_frame(iter, "byte array").map(|frame| frame.content.to_vec())
    }
}

/// Serialized [`Data`](crate::serialization::Data) codec.
pub mod data {
    use super::*;
    use crate::serialization::Data;

    /// Appends the serialized form as one frame.
    pub fn encode(message: &mut ClientMessage, value: &Data) -> Result<()> {
        message.append(Frame::from_slice(value.as_bytes()))
    }

    /// Decodes the next frame as serialized data, validating its header.
    pub fn decode(iter: &mut FrameIterator<'_>) -> Result<Data> {
        let frame = take_value_frame(iter, "data")?;
        Data::from_bytes(frame.content.clone().freeze())
    }
}

//! Operation codecs.
//!
//! Each codec turns typed parameters into a request [`ClientMessage`] and
//! decodes the matching response (and, for listener registrations, the
//! event messages the member pushes afterwards). Member-side encoders are
//! compiled only with the `server-codecs` feature; tests use them to build
//! the messages a member would send.

mod address;
pub mod client_authentication;
pub mod client_statistics;
pub mod map_entry_listener;
pub mod map_remove_entry_listener;

pub use address::Address;

use crate::error::{HzError, Result};
use crate::protocol::{
    ClientMessage, Frame, FrameIterator, EXCEPTION_MESSAGE_TYPE, PARTITION_ID_ANY,
    PARTITION_ID_FIELD_OFFSET, TYPE_FIELD_OFFSET, UNFRAGMENTED_MESSAGE,
};

/// Starts a request: an empty message plus its zeroed initial frame.
///
/// The partition id defaults to "any"; callers fill operation fields into
/// the returned frame before appending it.
pub(crate) fn request_initial_frame(message_type: i32, size: usize) -> Result<Frame> {
    let mut frame = Frame::zeroed(size, UNFRAGMENTED_MESSAGE);
    frame.write_int_at(TYPE_FIELD_OFFSET, message_type)?;
    frame.write_int_at(PARTITION_ID_FIELD_OFFSET, PARTITION_ID_ANY)?;
    Ok(frame)
}

/// Starts a response or event initial frame.
#[cfg(feature = "server-codecs")]
pub(crate) fn initial_frame(message_type: i32, size: usize, flags: u16) -> Result<Frame> {
    let mut frame = Frame::zeroed(size, UNFRAGMENTED_MESSAGE | flags);
    frame.write_int_at(TYPE_FIELD_OFFSET, message_type)?;
    Ok(frame)
}

/// Opens a decode pass over `message` after checking its type.
///
/// An error response from the member surfaces as a protocol error rather
/// than being misread as the expected message.
pub(crate) fn expect_message<'a>(
    message: &'a ClientMessage,
    expected_type: i32,
) -> Result<(FrameIterator<'a>, &'a Frame)> {
    let actual = message.message_type()?;
    if actual != expected_type {
        if actual == EXCEPTION_MESSAGE_TYPE {
            return Err(HzError::Protocol(format!(
                "member returned an error instead of message type {expected_type:#08x}"
            )));
        }
        return Err(HzError::Protocol(format!(
            "expected message type {expected_type:#08x}, got {actual:#08x}"
        )));
    }
    let mut iter = message.iter()?;
    let initial = iter.take()?;
    Ok((iter, initial))
}

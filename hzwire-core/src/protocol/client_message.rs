//! ClientMessage type for multi-frame protocol messages.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use bytes::BytesMut;

use super::constants::*;
use super::frame::Frame;
use crate::error::{HzError, Result};

/// Global correlation ID counter.
static CORRELATION_ID_COUNTER: AtomicI64 = AtomicI64::new(1);

/// Generates a unique correlation ID for a request.
pub fn next_correlation_id() -> i64 {
    CORRELATION_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A client message composed of one or more frames.
///
/// The first frame is the "initial frame" holding the fixed header fields
/// (type, correlation id, partition id for requests and events, backup acks
/// for responses) followed by operation-specific fixed fields. Variable-size
/// fields follow as standalone frames.
///
/// Frames are append-only: once a message is sealed (handed to a transport),
/// appending fails with a protocol error.
pub struct ClientMessage {
    frames: Vec<Frame>,
    retryable: bool,
    operation_name: Cow<'static, str>,
    sealed: bool,
    cursor_held: AtomicBool,
}

impl ClientMessage {
    /// Creates a new empty client message.
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            retryable: false,
            operation_name: Cow::Borrowed(""),
            sealed: false,
            cursor_held: AtomicBool::new(false),
        }
    }

    /// Creates an empty request message with its diagnostics metadata.
    pub fn new_request(operation_name: &'static str, retryable: bool) -> Self {
        Self {
            retryable,
            operation_name: Cow::Borrowed(operation_name),
            ..Self::new()
        }
    }

    /// Creates a sealed message from received frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            sealed: true,
            ..Self::new()
        }
    }

    /// Appends a frame to the message.
    ///
    /// Fails with [`HzError::Protocol`] once the message is sealed.
    pub fn append(&mut self, frame: Frame) -> Result<()> {
        if self.sealed {
            return Err(HzError::Protocol(format!(
                "cannot append to sealed message '{}'",
                self.operation_name
            )));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Marks the message as complete; no more frames can be appended.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns `true` if the message no longer accepts frames.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns whether the message may be resent verbatim.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Sets whether the message may be resent verbatim.
    pub fn set_retryable(&mut self, retryable: bool) {
        self.retryable = retryable;
    }

    /// Returns the operation name used in diagnostics.
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    fn initial(&self) -> Result<&Frame> {
        self.frames
            .first()
            .ok_or_else(|| HzError::Framing("message has no initial frame".to_string()))
    }

    fn initial_mut(&mut self) -> Result<&mut Frame> {
        self.frames
            .first_mut()
            .ok_or_else(|| HzError::Framing("message has no initial frame".to_string()))
    }

    /// Returns the message type from the initial frame.
    pub fn message_type(&self) -> Result<i32> {
        self.initial()?.read_int_at(TYPE_FIELD_OFFSET)
    }

    /// Returns the correlation ID from the initial frame.
    pub fn correlation_id(&self) -> Result<i64> {
        self.initial()?.read_long_at(CORRELATION_ID_FIELD_OFFSET)
    }

    /// Sets the correlation ID in the initial frame.
    pub fn set_correlation_id(&mut self, correlation_id: i64) -> Result<()> {
        self.initial_mut()?
            .write_long_at(CORRELATION_ID_FIELD_OFFSET, correlation_id)
    }

    /// Returns the partition ID from the initial frame (requests and events).
    pub fn partition_id(&self) -> Result<i32> {
        self.initial()?.read_int_at(PARTITION_ID_FIELD_OFFSET)
    }

    /// Sets the partition ID in the initial frame.
    pub fn set_partition_id(&mut self, partition_id: i32) -> Result<()> {
        self.initial_mut()?
            .write_int_at(PARTITION_ID_FIELD_OFFSET, partition_id)
    }

    /// Returns the number of backup acknowledgements a response expects.
    pub fn backup_acks(&self) -> Result<u8> {
        self.initial()?.read_byte_at(RESPONSE_BACKUP_ACKS_FIELD_OFFSET)
    }

    /// Returns a reference to the initial (first) frame, if present.
    pub fn initial_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Returns a reference to all frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Consumes the message, returning its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Returns the number of frames in the message.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the message has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Calculates the total size of the message on the wire.
    pub fn wire_size(&self) -> usize {
        self.frames.iter().map(Frame::wire_size).sum()
    }

    /// Writes all frames to the destination buffer.
    ///
    /// The last frame is written with the FINAL flag set.
    pub fn write_to(&self, dst: &mut BytesMut) {
        let last = self.frames.len().saturating_sub(1);
        for (index, frame) in self.frames.iter().enumerate() {
            if index == last && !frame.is_final_frame() {
                Frame::new(frame.content.clone(), frame.flags | IS_FINAL_FLAG).write_to(dst);
            } else {
                frame.write_to(dst);
            }
        }
    }

    /// Returns true if this message is flagged as an event.
    pub fn is_event(&self) -> bool {
        self.frames.first().is_some_and(Frame::is_event_frame)
    }

    /// Acquires the frame cursor for one decode pass.
    ///
    /// Only one cursor may be live per message; a second call while the first
    /// iterator is still alive fails instead of silently re-reading frames.
    /// Dropping the iterator releases the cursor.
    pub fn iter(&self) -> Result<FrameIterator<'_>> {
        if self.cursor_held.swap(true, Ordering::AcqRel) {
            return Err(HzError::Protocol(format!(
                "message '{}' is already being iterated",
                self.operation_name
            )));
        }
        Ok(FrameIterator {
            message: self,
            position: 0,
        })
    }
}

impl Default for ClientMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ClientMessage {
    /// Produces an unsealed copy with a released cursor, suitable for re-issue.
    fn clone(&self) -> Self {
        Self {
            frames: self.frames.clone(),
            retryable: self.retryable,
            operation_name: self.operation_name.clone(),
            sealed: false,
            cursor_held: AtomicBool::new(false),
        }
    }
}

impl PartialEq for ClientMessage {
    fn eq(&self, other: &Self) -> bool {
        self.frames == other.frames
    }
}

impl Eq for ClientMessage {}

impl fmt::Debug for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientMessage")
            .field("operation_name", &self.operation_name)
            .field("message_type", &self.message_type().ok())
            .field("correlation_id", &self.correlation_id().ok())
            .field("frames", &self.frames.len())
            .field("retryable", &self.retryable)
            .field("sealed", &self.sealed)
            .finish()
    }
}

/// A forward-only cursor over the frames of one message.
pub struct FrameIterator<'a> {
    message: &'a ClientMessage,
    position: usize,
}

impl<'a> FrameIterator<'a> {
    /// Takes the next frame, failing if the message is exhausted.
    pub fn take(&mut self) -> Result<&'a Frame> {
        let frame = self.message.frames.get(self.position).ok_or_else(|| {
            HzError::Framing(format!(
                "message '{}' ended after {} frames",
                self.message.operation_name, self.position
            ))
        })?;
        self.position += 1;
        Ok(frame)
    }

    /// Returns the next frame without consuming it.
    pub fn peek(&self) -> Option<&'a Frame> {
        self.message.frames.get(self.position)
    }

    /// Skips the next frame without interpreting its payload.
    pub fn skip(&mut self) -> Result<()> {
        self.take().map(|_| ())
    }

    /// Returns `true` if at least one frame remains.
    pub fn has_next(&self) -> bool {
        self.position < self.message.frames.len()
    }

    /// Returns `true` if the next frame closes a data structure.
    pub fn next_is_end_frame(&self) -> bool {
        self.peek().is_some_and(Frame::is_end_frame)
    }

    /// Skips frames up to and including the end frame of the current data structure.
    ///
    /// Nested structures are skipped as a whole, so trailing fields added by
    /// newer members are ignored.
    pub fn fast_forward_to_end_frame(&mut self) -> Result<()> {
        let mut expected_end_frames = 1usize;
        while expected_end_frames > 0 {
            let frame = self.take()?;
            if frame.is_end_frame() {
                expected_end_frames -= 1;
            } else if frame.is_begin_frame() {
                expected_end_frames += 1;
            }
        }
        Ok(())
    }
}

impl Drop for FrameIterator<'_> {
    fn drop(&mut self) {
        self.message.cursor_held.store(false, Ordering::Release);
    }
}

impl fmt::Debug for FrameIterator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameIterator")
            .field("position", &self.position)
            .field("frames", &self.message.frames.len())
            .finish()
    }
}

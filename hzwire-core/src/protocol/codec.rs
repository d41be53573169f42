//! Codec implementation for encoding/decoding client protocol messages.

use std::collections::HashMap;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use super::constants::*;
use super::fragment;
use super::frame::Frame;
use super::ClientMessage;
use crate::error::{HzError, Result};

/// Fragmented messages a decoder reassembles at once unless configured otherwise.
pub const DEFAULT_MAX_PENDING_FRAGMENTS: usize = 256;

/// Codec for encoding and decoding client messages.
///
/// Implements the `tokio_util::codec::{Encoder, Decoder}` traits for use
/// with tokio's framed I/O. Inbound frames are accumulated until a frame
/// carrying the final flag arrives; fragmented messages are reassembled
/// here, so operation codecs only ever see complete messages.
#[derive(Debug)]
pub struct ClientMessageCodec {
    /// Frames accumulated while decoding the current message or fragment.
    pending_frames: Vec<Frame>,
    /// Partially received fragmented messages, keyed by fragment id.
    fragments: HashMap<i64, Vec<Frame>>,
    /// Upper bound on `fragments.len()`.
    max_pending_fragments: usize,
    /// Outbound messages larger than this are split into fragments.
    max_message_size: Option<usize>,
}

impl Default for ClientMessageCodec {
    fn default() -> Self {
        Self {
            pending_frames: Vec::new(),
            fragments: HashMap::new(),
            max_pending_fragments: DEFAULT_MAX_PENDING_FRAGMENTS,
            max_message_size: None,
        }
    }
}

impl ClientMessageCodec {
    /// Creates a new codec instance that never fragments outbound messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec that splits outbound messages above `max_message_size` bytes.
    pub fn with_max_message_size(max_message_size: usize) -> Self {
        Self {
            max_message_size: Some(max_message_size),
            ..Self::default()
        }
    }

    /// Limits how many fragmented messages may be in flight at once.
    ///
    /// A begin fragment beyond the limit is a framing error.
    pub fn max_pending_fragments(mut self, limit: usize) -> Self {
        self.max_pending_fragments = limit;
        self
    }

    /// Returns the number of fragmented messages still being reassembled.
    pub fn pending_fragments(&self) -> usize {
        self.fragments.len()
    }

    /// Handles one complete wire unit (a message or a fragment).
    fn assemble(&mut self, frames: Vec<Frame>) -> Result<Option<ClientMessage>> {
        let Some(first) = frames.first() else {
            return Ok(None);
        };

        if first.is_unfragmented() {
            return Ok(Some(ClientMessage::from_frames(frames)));
        }

        let fragment_id = first.read_long_at(FRAGMENTATION_ID_OFFSET)?;
        let is_begin = first.is_begin_fragment();
        let is_end = first.is_end_fragment();
        let mut body = frames.into_iter().skip(1).collect::<Vec<_>>();

        if is_begin {
            tracing::trace!(fragment_id, frames = body.len(), "fragment started");
            if self.fragments.contains_key(&fragment_id) {
                return Err(HzError::Framing(format!(
                    "fragment {fragment_id} started twice"
                )));
            }
            if self.fragments.len() >= self.max_pending_fragments {
                return Err(HzError::Framing(format!(
                    "more than {} fragmented messages in flight",
                    self.max_pending_fragments
                )));
            }
            strip_final_flag(&mut body);
            self.fragments.insert(fragment_id, body);
            return Ok(None);
        }

        let Some(collected) = self.fragments.get_mut(&fragment_id) else {
            tracing::warn!(fragment_id, "dropping fragment of unknown message");
            return Ok(None);
        };

        if !is_end {
            strip_final_flag(&mut body);
            collected.append(&mut body);
            return Ok(None);
        }

        let mut frames = self.fragments.remove(&fragment_id).unwrap_or_default();
        frames.append(&mut body);
        tracing::trace!(fragment_id, frames = frames.len(), "fragmented message reassembled");
        Ok(Some(ClientMessage::from_frames(frames)))
    }
}

/// Clears the final flag that closed a non-terminal fragment.
fn strip_final_flag(frames: &mut [Frame]) {
    if let Some(last) = frames.last_mut() {
        last.flags &= !IS_FINAL_FLAG;
    }
}

impl Encoder<ClientMessage> for ClientMessageCodec {
    type Error = HzError;

    fn encode(&mut self, mut item: ClientMessage, dst: &mut BytesMut) -> Result<()> {
        if item.is_empty() {
            return Err(HzError::Protocol("cannot encode empty message".to_string()));
        }

        item.seal();
        match self.max_message_size {
            Some(max) if item.wire_size() > max => {
                for part in fragment::split(&item, max)? {
                    part.write_to(dst);
                }
            }
            _ => item.write_to(dst),
        }
        Ok(())
    }
}

impl Decoder for ClientMessageCodec {
    type Item = ClientMessage;
    type Error = HzError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        while let Some(frame) = Frame::read_from(src)? {
            let is_final = frame.is_final_frame();
            self.pending_frames.push(frame);

            if is_final {
                let frames = std::mem::take(&mut self.pending_frames);
                if let Some(message) = self.assemble(frames)? {
                    return Ok(Some(message));
                }
            }
        }
        Ok(None)
    }
}

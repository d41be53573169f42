//! Splitting of oversized messages into wire fragments.
//!
//! Each fragment is sent as its own frame sequence: a leading frame holding
//! the fragment id (flagged begin, end or neither) followed by a run of the
//! original frames. The decoder in [`super::ClientMessageCodec`] reverses this.

use std::sync::atomic::{AtomicI64, Ordering};

use super::constants::*;
use super::frame::Frame;
use super::ClientMessage;
use crate::error::Result;

static FRAGMENT_ID_COUNTER: AtomicI64 = AtomicI64::new(1);

fn next_fragment_id() -> i64 {
    FRAGMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Splits `message` into fragments of at most `max_size` wire bytes.
///
/// A frame is never cut: a single frame larger than `max_size` travels as a
/// fragment of its own. Messages that already fit are returned unchanged.
pub fn split(message: &ClientMessage, max_size: usize) -> Result<Vec<ClientMessage>> {
    if message.wire_size() <= max_size {
        return Ok(vec![message.clone()]);
    }

    let header_size = FRAME_HEADER_SIZE + LONG_SIZE;
    let mut runs: Vec<Vec<Frame>> = Vec::new();
    let mut current: Vec<Frame> = Vec::new();
    let mut current_size = header_size;

    for frame in message.frames() {
        if !current.is_empty() && current_size + frame.wire_size() > max_size {
            runs.push(std::mem::take(&mut current));
            current_size = header_size;
        }
        current_size += frame.wire_size();
        current.push(frame.clone());
    }
    if !current.is_empty() {
        runs.push(current);
    }

    if runs.len() < 2 {
        return Ok(vec![message.clone()]);
    }

    let fragment_id = next_fragment_id();
    let last = runs.len() - 1;
    let mut fragments = Vec::with_capacity(runs.len());
    for (index, run) in runs.into_iter().enumerate() {
        let flags = match index {
            0 => BEGIN_FRAGMENT_FLAG,
            i if i == last => END_FRAGMENT_FLAG,
            _ => DEFAULT_FLAGS,
        };
        let mut header = Frame::zeroed(LONG_SIZE, flags);
        header.write_long_at(FRAGMENTATION_ID_OFFSET, fragment_id)?;

        let mut frames = Vec::with_capacity(run.len() + 1);
        frames.push(header);
        frames.extend(run);
        fragments.push(ClientMessage::from_frames(frames));
    }

    tracing::trace!(
        operation = message.operation_name(),
        fragment_id,
        fragments = fragments.len(),
        "message split into fragments"
    );
    Ok(fragments)
}

//! Client binary protocol implementation.
//!
//! Frames, messages, the framing codec with fragment reassembly, and the
//! codec primitives every operation codec is built from.

pub mod builtin;
mod client_message;
mod codec;
pub mod constants;
pub mod fragment;
mod frame;

pub use client_message::{next_correlation_id, ClientMessage, FrameIterator};
pub use codec::ClientMessageCodec;
pub use constants::*;
pub use frame::Frame;

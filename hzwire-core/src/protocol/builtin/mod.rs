//! Codec primitives shared by every operation codec.
//!
//! Each primitive is a pair of free functions, `encode(message, value)` and
//! `decode(iterator)`, with no shared state, so they compose: the nullable
//! and list codecs take the element codec as a function argument.

pub mod fixed;
pub mod list;
pub mod list_fixed;
pub mod nullable;
pub mod var;

pub use var::{byte_array, data, string};

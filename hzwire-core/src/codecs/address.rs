//! Member address, encoded as a custom (begin/end framed) type.

use std::fmt;

use crate::error::Result;
use crate::protocol::builtin::string;
use crate::protocol::{ClientMessage, Frame, FrameIterator, INT_SIZE};

const PORT_FIELD_OFFSET: usize = 0;
const INITIAL_FRAME_SIZE: usize = PORT_FIELD_OFFSET + INT_SIZE;

/// A member's network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Host name or IP literal.
    pub host: String,
    /// TCP port.
    pub port: i32,
}

impl Address {
    /// Creates an address.
    pub fn new(host: impl Into<String>, port: i32) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Appends the address as a begin frame, fixed fields, host and end frame.
    pub fn encode(message: &mut ClientMessage, address: &Address) -> Result<()> {
        message.append(Frame::new_begin_frame())?;
        let mut initial = Frame::zeroed(INITIAL_FRAME_SIZE, 0);
        initial.write_int_at(PORT_FIELD_OFFSET, address.port)?;
        message.append(initial)?;
        string::encode(message, &address.host)?;
        message.append(Frame::new_end_frame())
    }

    /// Decodes an address, skipping any trailing fields a newer member added.
    pub fn decode(iter: &mut FrameIterator<'_>) -> Result<Address> {
        iter.skip()?;
        let initial = iter.take()?;
        let port = initial.read_int_at(PORT_FIELD_OFFSET)?;
        let host = string::decode(iter)?;
        iter.fast_forward_to_end_frame()?;
        Ok(Address { host, port })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

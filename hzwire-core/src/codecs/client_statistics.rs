//! Periodic client statistics report.

use super::{expect_message, request_initial_frame};
use crate::error::Result;
use crate::protocol::builtin::{byte_array, string};
use crate::protocol::{ClientMessage, LONG_SIZE, REQUEST_HEADER_SIZE};

/// Request message type.
pub const REQUEST_MESSAGE_TYPE: i32 = 0x000C00;
/// Response message type.
pub const RESPONSE_MESSAGE_TYPE: i32 = 0x000C01;

const REQUEST_TIMESTAMP_FIELD_OFFSET: usize = REQUEST_HEADER_SIZE;
const REQUEST_INITIAL_FRAME_SIZE: usize = REQUEST_TIMESTAMP_FIELD_OFFSET + LONG_SIZE;

/// Parameters of a statistics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsRequest {
    /// Collection time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Escaped `key=value` attribute pairs separated by commas.
    pub client_attributes: String,
    /// Opaque metrics payload.
    pub metrics_blob: Vec<u8>,
}

/// Encodes a statistics request. Statistics are never retried.
pub fn encode_request(request: &StatisticsRequest) -> Result<ClientMessage> {
    let mut message = ClientMessage::new_request("Client.Statistics", false);
    let mut initial = request_initial_frame(REQUEST_MESSAGE_TYPE, REQUEST_INITIAL_FRAME_SIZE)?;
    initial.write_long_at(REQUEST_TIMESTAMP_FIELD_OFFSET, request.timestamp)?;
    message.append(initial)?;
    string::encode(&mut message, &request.client_attributes)?;
    byte_array::encode(&mut message, &request.metrics_blob)?;
    Ok(message)
}

/// Checks that `message` is the (empty) statistics response.
pub fn decode_response(message: &ClientMessage) -> Result<()> {
    expect_message(message, RESPONSE_MESSAGE_TYPE).map(|_| ())
}

/// Decodes a request on the member side.
#[cfg(feature = "server-codecs")]
pub fn decode_request(message: &ClientMessage) -> Result<StatisticsRequest> {
    let (mut iter, initial) = expect_message(message, REQUEST_MESSAGE_TYPE)?;
    Ok(StatisticsRequest {
        timestamp: initial.read_long_at(REQUEST_TIMESTAMP_FIELD_OFFSET)?,
        client_attributes: string::decode(&mut iter)?,
        metrics_blob: byte_array::decode(&mut iter)?,
    })
}

/// Encodes the empty response on the member side.
#[cfg(feature = "server-codecs")]
pub fn encode_response() -> Result<ClientMessage> {
    let mut message = ClientMessage::new();
    message.append(super::initial_frame(
        RESPONSE_MESSAGE_TYPE,
        crate::protocol::RESPONSE_HEADER_SIZE,
        0,
    )?)?;
    Ok(message)
}

//! Map entry listener removal.

use uuid::Uuid;

use super::{expect_message, request_initial_frame};
use crate::error::Result;
use crate::protocol::builtin::string;
use crate::protocol::{ClientMessage, BOOL_SIZE, GUID_SIZE, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE};

/// Request message type.
pub const REQUEST_MESSAGE_TYPE: i32 = 0x011A00;
/// Response message type.
pub const RESPONSE_MESSAGE_TYPE: i32 = 0x011A01;

const REQUEST_REGISTRATION_ID_FIELD_OFFSET: usize = REQUEST_HEADER_SIZE;
const REQUEST_INITIAL_FRAME_SIZE: usize = REQUEST_REGISTRATION_ID_FIELD_OFFSET + GUID_SIZE;
const RESPONSE_RESPONSE_FIELD_OFFSET: usize = RESPONSE_HEADER_SIZE;
#[cfg_attr(not(feature = "server-codecs"), allow(dead_code))]
const RESPONSE_INITIAL_FRAME_SIZE: usize = RESPONSE_RESPONSE_FIELD_OFFSET + BOOL_SIZE;

/// Encodes a removal request. Removal is idempotent and may be retried.
pub fn encode_request(name: &str, registration_id: Uuid) -> Result<ClientMessage> {
    let mut message = ClientMessage::new_request("Map.RemoveEntryListener", true);
    let mut initial = request_initial_frame(REQUEST_MESSAGE_TYPE, REQUEST_INITIAL_FRAME_SIZE)?;
    initial.write_guid_at(REQUEST_REGISTRATION_ID_FIELD_OFFSET, Some(registration_id))?;
    message.append(initial)?;
    string::encode(&mut message, name)?;
    Ok(message)
}

/// Decodes whether the member still had the registration.
pub fn decode_response(message: &ClientMessage) -> Result<bool> {
    let (_, initial) = expect_message(message, RESPONSE_MESSAGE_TYPE)?;
    initial.read_bool_at(RESPONSE_RESPONSE_FIELD_OFFSET)
}

/// Decodes a removal request on the member side.
#[cfg(feature = "server-codecs")]
pub fn decode_request(message: &ClientMessage) -> Result<(String, Option<Uuid>)> {
    let (mut iter, initial) = expect_message(message, REQUEST_MESSAGE_TYPE)?;
    let registration_id = initial.read_guid_at(REQUEST_REGISTRATION_ID_FIELD_OFFSET)?;
    Ok((string::decode(&mut iter)?, registration_id))
}

/// Encodes the removal response on the member side.
#[cfg(feature = "server-codecs")]
pub fn encode_response(removed: bool) -> Result<ClientMessage> {
    let mut message = ClientMessage::new();
    let mut initial = super::initial_frame(RESPONSE_MESSAGE_TYPE, RESPONSE_INITIAL_FRAME_SIZE, 0)?;
    initial.write_bool_at(RESPONSE_RESPONSE_FIELD_OFFSET, removed)?;
    message.append(initial)?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Frame, UNFRAGMENTED_MESSAGE};

    #[test]
    fn test_request_layout() {
        let id = Uuid::new_v4();
        let message = encode_request("orders", id).unwrap();

        assert!(message.is_retryable());
        assert_eq!(message.message_type().unwrap(), REQUEST_MESSAGE_TYPE);
        let initial = message.initial_frame().unwrap();
        assert_eq!(initial.content.len(), 33);
        assert_eq!(initial.read_guid_at(16).unwrap(), Some(id));
        assert_eq!(&message.frames()[1].content[..], b"orders");
    }

    #[test]
    fn test_decode_response() {
        for removed in [true, false] {
            let mut initial = Frame::zeroed(14, UNFRAGMENTED_MESSAGE);
            initial.write_int_at(0, RESPONSE_MESSAGE_TYPE).unwrap();
            initial.write_bool_at(13, removed).unwrap();
            let message = ClientMessage::from_frames(vec![initial]);
            assert_eq!(decode_response(&message).unwrap(), removed);
        }
    }

    #[cfg(feature = "server-codecs")]
    #[test]
    fn test_member_side_round_trip() {
        let id = Uuid::new_v4();
        let (name, decoded) = decode_request(&encode_request("orders", id).unwrap()).unwrap();
        assert_eq!(name, "orders");
        assert_eq!(decoded, Some(id));
        assert!(decode_response(&encode_response(true).unwrap()).unwrap());
    }
}

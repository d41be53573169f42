//! Map entry listener registration and its entry events.
//!
//! Four operations share one layout and differ only in message type and in
//! which filter frames follow the map name: none, a key, a predicate, or a
//! key and a predicate. [`EntryListenerCodec`] names one of them.

use uuid::Uuid;

use super::{expect_message, request_initial_frame};
use crate::error::{HzError, Result};
use crate::protocol::builtin::{data, nullable, string};
use crate::protocol::{
    ClientMessage, BOOL_SIZE, EVENT_HEADER_SIZE, GUID_SIZE, INT_SIZE, REQUEST_HEADER_SIZE,
    RESPONSE_HEADER_SIZE,
};
use crate::serialization::Data;

const REQUEST_INCLUDE_VALUE_FIELD_OFFSET: usize = REQUEST_HEADER_SIZE;
const REQUEST_LISTENER_FLAGS_FIELD_OFFSET: usize = REQUEST_INCLUDE_VALUE_FIELD_OFFSET + BOOL_SIZE;
const REQUEST_LOCAL_ONLY_FIELD_OFFSET: usize = REQUEST_LISTENER_FLAGS_FIELD_OFFSET + INT_SIZE;
const REQUEST_INITIAL_FRAME_SIZE: usize = REQUEST_LOCAL_ONLY_FIELD_OFFSET + BOOL_SIZE;

const RESPONSE_RESPONSE_FIELD_OFFSET: usize = RESPONSE_HEADER_SIZE;
#[cfg_attr(not(feature = "server-codecs"), allow(dead_code))]
const RESPONSE_INITIAL_FRAME_SIZE: usize = RESPONSE_RESPONSE_FIELD_OFFSET + GUID_SIZE;

const EVENT_ENTRY_EVENT_TYPE_FIELD_OFFSET: usize = EVENT_HEADER_SIZE;
const EVENT_ENTRY_UUID_FIELD_OFFSET: usize = EVENT_ENTRY_EVENT_TYPE_FIELD_OFFSET + INT_SIZE;
const EVENT_ENTRY_NUMBER_OF_AFFECTED_ENTRIES_FIELD_OFFSET: usize =
    EVENT_ENTRY_UUID_FIELD_OFFSET + GUID_SIZE;
#[cfg_attr(not(feature = "server-codecs"), allow(dead_code))]
const EVENT_ENTRY_INITIAL_FRAME_SIZE: usize =
    EVENT_ENTRY_NUMBER_OF_AFFECTED_ENTRIES_FIELD_OFFSET + INT_SIZE;

/// Parameters of an add-entry-listener request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEntryListenerRequest {
    /// Map name.
    pub name: String,
    /// Serialized key to listen on, for the key-filtered variants.
    pub key: Option<Data>,
    /// Serialized predicate, for the predicate-filtered variants.
    pub predicate: Option<Data>,
    /// Whether events should carry values.
    pub include_value: bool,
    /// Event-type mask the member filters on.
    pub listener_flags: i32,
    /// Whether to listen on the connected member only.
    pub local_only: bool,
}

/// An entry event as decoded from the wire, values still serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryEventParameters {
    /// Serialized key.
    pub key: Option<Data>,
    /// Serialized new value.
    pub value: Option<Data>,
    /// Serialized previous value.
    pub old_value: Option<Data>,
    /// Serialized merging value (merge events only).
    pub merging_value: Option<Data>,
    /// Event-type bits.
    pub event_type: i32,
    /// Uuid of the member that raised the event.
    pub member_uuid: Option<Uuid>,
    /// Number of entries affected (map-wide events).
    pub number_of_affected_entries: i32,
}

/// One of the four entry-listener registration operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryListenerCodec {
    request_type: i32,
    operation_name: &'static str,
    has_key: bool,
    has_predicate: bool,
}

impl EntryListenerCodec {
    /// Listens on every entry of the map.
    pub const ALL: Self = Self {
        request_type: 0x011900,
        operation_name: "Map.AddEntryListener",
        has_key: false,
        has_predicate: false,
    };

    /// Listens on one key.
    pub const TO_KEY: Self = Self {
        request_type: 0x011800,
        operation_name: "Map.AddEntryListenerToKey",
        has_key: true,
        has_predicate: false,
    };

    /// Listens on entries matching a predicate.
    pub const WITH_PREDICATE: Self = Self {
        request_type: 0x011700,
        operation_name: "Map.AddEntryListenerWithPredicate",
        has_key: false,
        has_predicate: true,
    };

    /// Listens on one key, further filtered by a predicate.
    pub const TO_KEY_WITH_PREDICATE: Self = Self {
        request_type: 0x011600,
        operation_name: "Map.AddEntryListenerToKeyWithPredicate",
        has_key: true,
        has_predicate: true,
    };

    /// Selects the operation matching the filters present.
    pub const fn for_filters(has_key: bool, has_predicate: bool) -> Self {
        match (has_key, has_predicate) {
            (false, false) => Self::ALL,
            (true, false) => Self::TO_KEY,
            (false, true) => Self::WITH_PREDICATE,
            (true, true) => Self::TO_KEY_WITH_PREDICATE,
        }
    }

    /// Request message type.
    pub const fn request_message_type(&self) -> i32 {
        self.request_type
    }

    /// Response message type.
    pub const fn response_message_type(&self) -> i32 {
        self.request_type + 1
    }

    /// Entry event message type.
    pub const fn event_message_type(&self) -> i32 {
        self.request_type + 2
    }

    /// Operation name used in diagnostics.
    pub const fn operation_name(&self) -> &'static str {
        self.operation_name
    }

    /// Returns true if `message` is an entry event of this operation.
    pub fn is_event(&self, message: &ClientMessage) -> bool {
        message
            .message_type()
            .is_ok_and(|t| t == self.event_message_type())
    }

    fn check_filters(&self, key: Option<&Data>, predicate: Option<&Data>) -> Result<()> {
        if key.is_some() != self.has_key || predicate.is_some() != self.has_predicate {
            return Err(HzError::Protocol(format!(
                "{} expects key: {}, predicate: {}",
                self.operation_name, self.has_key, self.has_predicate
            )));
        }
        Ok(())
    }

    /// Encodes the registration request.
    ///
    /// The filters present in `request` must match this operation. The
    /// request is not retryable: a blind resend could register twice.
    pub fn encode_request(&self, request: &AddEntryListenerRequest) -> Result<ClientMessage> {
        self.check_filters(request.key.as_ref(), request.predicate.as_ref())?;

        let mut message = ClientMessage::new_request(self.operation_name, false);
        let mut initial = request_initial_frame(self.request_type, REQUEST_INITIAL_FRAME_SIZE)?;
        initial.write_bool_at(REQUEST_INCLUDE_VALUE_FIELD_OFFSET, request.include_value)?;
        initial.write_int_at(REQUEST_LISTENER_FLAGS_FIELD_OFFSET, request.listener_flags)?;
        initial.write_bool_at(REQUEST_LOCAL_ONLY_FIELD_OFFSET, request.local_only)?;
        message.append(initial)?;
        string::encode(&mut message, &request.name)?;
        if let Some(key) = &request.key {
            data::encode(&mut message, key)?;
        }
        if let Some(predicate) = &request.predicate {
            data::encode(&mut message, predicate)?;
        }
        Ok(message)
    }

    /// Decodes the registration id the member assigned.
    pub fn decode_response(&self, message: &ClientMessage) -> Result<Uuid> {
        let (_, initial) = expect_message(message, self.response_message_type())?;
        initial
            .read_guid_at(RESPONSE_RESPONSE_FIELD_OFFSET)?
            .ok_or_else(|| {
                HzError::Protocol(format!(
                    "{} response carries no registration id",
                    self.operation_name
                ))
            })
    }

    /// Decodes an entry event pushed for a registration of this operation.
    pub fn decode_event(&self, message: &ClientMessage) -> Result<EntryEventParameters> {
        let (mut iter, initial) = expect_message(message, self.event_message_type())?;
        let event_type = initial.read_int_at(EVENT_ENTRY_EVENT_TYPE_FIELD_OFFSET)?;
        let member_uuid = initial.read_guid_at(EVENT_ENTRY_UUID_FIELD_OFFSET)?;
        let number_of_affected_entries =
            initial.read_int_at(EVENT_ENTRY_NUMBER_OF_AFFECTED_ENTRIES_FIELD_OFFSET)?;
        Ok(EntryEventParameters {
            key: nullable::decode(&mut iter, data::decode)?,
            value: nullable::decode(&mut iter, data::decode)?,
            old_value: nullable::decode(&mut iter, data::decode)?,
            merging_value: nullable::decode(&mut iter, data::decode)?,
            event_type,
            member_uuid,
            number_of_affected_entries,
        })
    }

    /// Decodes a registration request on the member side.
    #[cfg(feature = "server-codecs")]
    pub fn decode_request(&self, message: &ClientMessage) -> Result<AddEntryListenerRequest> {
        let (mut iter, initial) = expect_message(message, self.request_type)?;
        let include_value = initial.read_bool_at(REQUEST_INCLUDE_VALUE_FIELD_OFFSET)?;
        let listener_flags = initial.read_int_at(REQUEST_LISTENER_FLAGS_FIELD_OFFSET)?;
        let local_only = initial.read_bool_at(REQUEST_LOCAL_ONLY_FIELD_OFFSET)?;
        let name = string::decode(&mut iter)?;
        let key = if self.has_key {
            Some(data::decode(&mut iter)?)
        } else {
            None
        };
        let predicate = if self.has_predicate {
            Some(data::decode(&mut iter)?)
        } else {
            None
        };
        Ok(AddEntryListenerRequest {
            name,
            key,
            predicate,
            include_value,
            listener_flags,
            local_only,
        })
    }

    /// Encodes the registration response on the member side.
    #[cfg(feature = "server-codecs")]
    pub fn encode_response(&self, registration_id: Uuid) -> Result<ClientMessage> {
        let mut message = ClientMessage::new();
        let mut initial = super::initial_frame(
            self.response_message_type(),
            RESPONSE_INITIAL_FRAME_SIZE,
            0,
        )?;
        initial.write_guid_at(RESPONSE_RESPONSE_FIELD_OFFSET, Some(registration_id))?;
        message.append(initial)?;
        Ok(message)
    }

    /// Encodes an entry event on the member side.
    #[cfg(feature = "server-codecs")]
    pub fn encode_event(&self, event: &EntryEventParameters) -> Result<ClientMessage> {
        use crate::protocol::{IS_EVENT_FLAG, PARTITION_ID_ANY, PARTITION_ID_FIELD_OFFSET};

        let mut message = ClientMessage::new();
        let mut initial = super::initial_frame(
            self.event_message_type(),
            EVENT_ENTRY_INITIAL_FRAME_SIZE,
            IS_EVENT_FLAG,
        )?;
        initial.write_int_at(PARTITION_ID_FIELD_OFFSET, PARTITION_ID_ANY)?;
        initial.write_int_at(EVENT_ENTRY_EVENT_TYPE_FIELD_OFFSET, event.event_type)?;
        initial.write_guid_at(EVENT_ENTRY_UUID_FIELD_OFFSET, event.member_uuid)?;
        initial.write_int_at(
            EVENT_ENTRY_NUMBER_OF_AFFECTED_ENTRIES_FIELD_OFFSET,
            event.number_of_affected_entries,
        )?;
        message.append(initial)?;
        for field in [&event.key, &event.value, &event.old_value, &event.merging_value] {
            nullable::encode(&mut message, field.as_ref(), data::encode)?;
        }
        Ok(message)
    }
}

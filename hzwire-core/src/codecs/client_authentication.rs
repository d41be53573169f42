//! Client authentication with opaque (custom) credentials.
//!
//! The response carries the member's serialization version, which the
//! client must verify before decoding any other typed payload.

use uuid::Uuid;

use super::{expect_message, request_initial_frame, Address};
use crate::error::Result;
use crate::protocol::builtin::{byte_array, list, nullable, string};
use crate::protocol::{
    ClientMessage, BYTE_SIZE, BOOL_SIZE, GUID_SIZE, INT_SIZE, REQUEST_HEADER_SIZE,
    RESPONSE_HEADER_SIZE,
};

/// Request message type.
pub const REQUEST_MESSAGE_TYPE: i32 = 0x000200;
/// Response message type.
pub const RESPONSE_MESSAGE_TYPE: i32 = 0x000201;

const REQUEST_UUID_FIELD_OFFSET: usize = REQUEST_HEADER_SIZE;
const REQUEST_SERIALIZATION_VERSION_FIELD_OFFSET: usize = REQUEST_UUID_FIELD_OFFSET + GUID_SIZE;
const REQUEST_INITIAL_FRAME_SIZE: usize = REQUEST_SERIALIZATION_VERSION_FIELD_OFFSET + BYTE_SIZE;

const RESPONSE_STATUS_FIELD_OFFSET: usize = RESPONSE_HEADER_SIZE;
const RESPONSE_MEMBER_UUID_FIELD_OFFSET: usize = RESPONSE_STATUS_FIELD_OFFSET + BYTE_SIZE;
const RESPONSE_SERIALIZATION_VERSION_FIELD_OFFSET: usize =
    RESPONSE_MEMBER_UUID_FIELD_OFFSET + GUID_SIZE;
const RESPONSE_PARTITION_COUNT_FIELD_OFFSET: usize =
    RESPONSE_SERIALIZATION_VERSION_FIELD_OFFSET + BYTE_SIZE;
const RESPONSE_CLUSTER_ID_FIELD_OFFSET: usize = RESPONSE_PARTITION_COUNT_FIELD_OFFSET + INT_SIZE;
const RESPONSE_FAILOVER_SUPPORTED_FIELD_OFFSET: usize =
    RESPONSE_CLUSTER_ID_FIELD_OFFSET + GUID_SIZE;
#[cfg_attr(not(feature = "server-codecs"), allow(dead_code))]
const RESPONSE_INITIAL_FRAME_SIZE: usize = RESPONSE_FAILOVER_SUPPORTED_FIELD_OFFSET + BOOL_SIZE;

/// Parameters of an authentication request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequest {
    /// Name of the cluster the client expects to join.
    pub cluster_name: String,
    /// Opaque credentials token.
    pub credentials: Vec<u8>,
    /// The client's own uuid.
    pub uuid: Uuid,
    /// Client implementation tag.
    pub client_type: String,
    /// Serialization version the client writes.
    pub serialization_version: u8,
    /// Client library version.
    pub client_version: String,
    /// Client instance name.
    pub client_name: String,
    /// Free-form labels.
    pub labels: Vec<String>,
}

/// Decoded authentication response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// Raw status byte; see `AuthenticationStatus` in the client crate.
    pub status: u8,
    /// Address of the member that answered, if reported.
    pub address: Option<Address>,
    /// Uuid of the member that answered.
    pub member_uuid: Option<Uuid>,
    /// Serialization version the member uses.
    pub serialization_version: u8,
    /// Member version string.
    pub server_version: String,
    /// Number of partitions in the cluster.
    pub partition_count: i32,
    /// Cluster id.
    pub cluster_id: Option<Uuid>,
    /// Whether the cluster supports failover clients.
    pub failover_supported: bool,
}

/// Encodes an authentication request.
pub fn encode_request(request: &AuthenticationRequest) -> Result<ClientMessage> {
    let mut message = ClientMessage::new_request("Client.AuthenticationCustom", true);
    let mut initial = request_initial_frame(REQUEST_MESSAGE_TYPE, REQUEST_INITIAL_FRAME_SIZE)?;
    initial.write_guid_at(REQUEST_UUID_FIELD_OFFSET, Some(request.uuid))?;
    initial.write_byte_at(
        REQUEST_SERIALIZATION_VERSION_FIELD_OFFSET,
        request.serialization_version,
    )?;
    message.append(initial)?;
    string::encode(&mut message, &request.cluster_name)?;
    byte_array::encode(&mut message, &request.credentials)?;
    string::encode(&mut message, &request.client_type)?;
    string::encode(&mut message, &request.client_version)?;
    string::encode(&mut message, &request.client_name)?;
    list::encode(&mut message, request.labels.iter(), |m, label| {
        string::encode(m, label)
    })?;
    Ok(message)
}

/// Decodes an authentication response.
pub fn decode_response(message: &ClientMessage) -> Result<AuthenticationResponse> {
    let (mut iter, initial) = expect_message(message, RESPONSE_MESSAGE_TYPE)?;
    let status = initial.read_byte_at(RESPONSE_STATUS_FIELD_OFFSET)?;
    let member_uuid = initial.read_guid_at(RESPONSE_MEMBER_UUID_FIELD_OFFSET)?;
    let serialization_version = initial.read_byte_at(RESPONSE_SERIALIZATION_VERSION_FIELD_OFFSET)?;
    let partition_count = initial.read_int_at(RESPONSE_PARTITION_COUNT_FIELD_OFFSET)?;
    let cluster_id = initial.read_guid_at(RESPONSE_CLUSTER_ID_FIELD_OFFSET)?;
    let failover_supported = initial.read_bool_at(RESPONSE_FAILOVER_SUPPORTED_FIELD_OFFSET)?;
    let address = nullable::decode(&mut iter, Address::decode)?;
    let server_version = string::decode(&mut iter)?;
    Ok(AuthenticationResponse {
        status,
        address,
        member_uuid,
        serialization_version,
        server_version,
        partition_count,
        cluster_id,
        failover_supported,
    })
}

/// Decodes a request on the member side.
#[cfg(feature = "server-codecs")]
pub fn decode_request(message: &ClientMessage) -> Result<AuthenticationRequest> {
    let (mut iter, initial) = expect_message(message, REQUEST_MESSAGE_TYPE)?;
    let uuid = initial
        .read_guid_at(REQUEST_UUID_FIELD_OFFSET)?
        .unwrap_or_else(Uuid::nil);
    let serialization_version = initial.read_byte_at(REQUEST_SERIALIZATION_VERSION_FIELD_OFFSET)?;
    Ok(AuthenticationRequest {
        cluster_name: string::decode(&mut iter)?,
        credentials: byte_array::decode(&mut iter)?,
        uuid,
        client_type: string::decode(&mut iter)?,
        serialization_version,
        client_version: string::decode(&mut iter)?,
        client_name: string::decode(&mut iter)?,
        labels: list::decode(&mut iter, string::decode)?,
    })
}

/// Encodes a response on the member side.
#[cfg(feature = "server-codecs")]
pub fn encode_response(response: &AuthenticationResponse) -> Result<ClientMessage> {
    let mut message = ClientMessage::new();
    let mut initial = super::initial_frame(RESPONSE_MESSAGE_TYPE, RESPONSE_INITIAL_FRAME_SIZE, 0)?;
    initial.write_byte_at(RESPONSE_STATUS_FIELD_OFFSET, response.status)?;
    initial.write_guid_at(RESPONSE_MEMBER_UUID_FIELD_OFFSET, response.member_uuid)?;
    initial.write_byte_at(
        RESPONSE_SERIALIZATION_VERSION_FIELD_OFFSET,
        response.serialization_version,
    )?;
    initial.write_int_at(RESPONSE_PARTITION_COUNT_FIELD_OFFSET, response.partition_count)?;
    initial.write_guid_at(RESPONSE_CLUSTER_ID_FIELD_OFFSET, response.cluster_id)?;
    initial.write_bool_at(
        RESPONSE_FAILOVER_SUPPORTED_FIELD_OFFSET,
        response.failover_supported,
    )?;
    message.append(initial)?;
    nullable::encode(&mut message, response.address.as_ref(), Address::encode)?;
    string::encode(&mut message, &response.server_version)?;
    Ok(message)
}

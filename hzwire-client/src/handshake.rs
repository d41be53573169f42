//! Connection authentication and serialization-version negotiation.

use hzwire_core::codecs::client_authentication::{
    self, AuthenticationRequest, AuthenticationResponse,
};
use hzwire_core::protocol::next_correlation_id;
use hzwire_core::serialization::SERIALIZATION_VERSION;
use hzwire_core::{HzError, NegotiatedSerialization, Result};
use uuid::Uuid;

use crate::cluster::Member;
use crate::config::ClientConfig;
use crate::transport::{ConnectionId, Transport};

/// Implementation tag sent to members.
pub const CLIENT_TYPE: &str = "RST";
/// Library version sent to members.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome reported by a member for an authentication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthenticationStatus {
    /// The client was accepted.
    Authenticated = 0,
    /// The credentials were rejected.
    CredentialsFailed = 1,
    /// The member writes another serialization version.
    SerializationVersionMismatch = 2,
    /// The client is not allowed in this cluster.
    NotAllowedInCluster = 3,
}

impl TryFrom<u8> for AuthenticationStatus {
    type Error = HzError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Authenticated),
            1 => Ok(Self::CredentialsFailed),
            2 => Ok(Self::SerializationVersionMismatch),
            3 => Ok(Self::NotAllowedInCluster),
            other => Err(HzError::Protocol(format!(
                "unknown authentication status {other}"
            ))),
        }
    }
}

/// What a successful handshake learned about the member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedMember {
    /// The member that answered.
    pub member: Member,
    /// The member's version string.
    pub server_version: String,
    /// Number of partitions in the cluster.
    pub partition_count: i32,
    /// Cluster id.
    pub cluster_id: Option<Uuid>,
}

/// Builds the authentication request for `config`.
pub fn authentication_request(config: &ClientConfig, client_uuid: Uuid) -> AuthenticationRequest {
    AuthenticationRequest {
        cluster_name: config.cluster_name().to_string(),
        credentials: config.credentials().to_vec(),
        uuid: client_uuid,
        client_type: CLIENT_TYPE.to_string(),
        serialization_version: SERIALIZATION_VERSION,
        client_version: CLIENT_VERSION.to_string(),
        client_name: config.client_name().to_string(),
        labels: config.labels().to_vec(),
    }
}

/// Checks an authentication response and records the member's
/// serialization version.
///
/// Typed payloads on the connection can be decoded only after this
/// succeeds. Any error here is fatal to the connection.
pub fn accept_response(
    response: &AuthenticationResponse,
    serialization: &NegotiatedSerialization,
) -> Result<AuthenticatedMember> {
    match AuthenticationStatus::try_from(response.status)? {
        AuthenticationStatus::Authenticated => {}
        AuthenticationStatus::CredentialsFailed => {
            return Err(HzError::Authentication(
                "credentials rejected by the member".to_string(),
            ));
        }
        AuthenticationStatus::SerializationVersionMismatch => {
            return Err(HzError::SerializationVersionMismatch {
                client: SERIALIZATION_VERSION,
                server: response.serialization_version,
            });
        }
        AuthenticationStatus::NotAllowedInCluster => {
            return Err(HzError::Authentication(
                "client is not allowed in the cluster".to_string(),
            ));
        }
    }

    let member_uuid = response.member_uuid.ok_or_else(|| {
        HzError::Protocol("authentication response carries no member uuid".to_string())
    })?;
    serialization.negotiate(response.serialization_version)?;

    Ok(AuthenticatedMember {
        member: Member::new(member_uuid, response.address.clone()),
        server_version: response.server_version.clone(),
        partition_count: response.partition_count,
        cluster_id: response.cluster_id,
    })
}

/// Authenticates `connection` and negotiates the serialization version.
pub async fn authenticate<T>(
    transport: &T,
    connection: ConnectionId,
    config: &ClientConfig,
    client_uuid: Uuid,
    serialization: &NegotiatedSerialization,
) -> Result<AuthenticatedMember>
where
    T: Transport + ?Sized,
{
    let mut request =
        client_authentication::encode_request(&authentication_request(config, client_uuid))?;
    request.set_correlation_id(next_correlation_id())?;

    let response = transport.send(connection, request).await?;
    let response = client_authentication::decode_response(&response)?;
    let member = accept_response(&response, serialization)?;

    tracing::info!(
        connection = %connection,
        member = %member.member,
        server_version = %member.server_version,
        "authenticated"
    );
    Ok(member)
}

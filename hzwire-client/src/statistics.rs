//! Client statistics reports.

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use hzwire_core::codecs::client_statistics::{self, StatisticsRequest};
use hzwire_core::protocol::next_correlation_id;
use hzwire_core::Result;

use crate::transport::{ConnectionId, Transport};

/// Builds the `key=value,key=value` attribute string of a statistics report.
///
/// Keys and values are escaped so that `=`, `.`, `,` and `\` never act as
/// separators.
#[derive(Debug, Clone, Default)]
pub struct StatisticsBuilder {
    attributes: String,
    metrics_blob: Vec<u8>,
}

impl StatisticsBuilder {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one attribute.
    pub fn attribute(mut self, key: &str, value: impl Display) -> Self {
        if !self.attributes.is_empty() {
            self.attributes.push(',');
        }
        escape_into(&mut self.attributes, key);
        self.attributes.push('=');
        escape_into(&mut self.attributes, &value.to_string());
        self
    }

    /// Sets the opaque metrics payload.
    pub fn metrics_blob(mut self, blob: Vec<u8>) -> Self {
        self.metrics_blob = blob;
        self
    }

    /// Returns the attribute string built so far.
    pub fn attributes(&self) -> &str {
        &self.attributes
    }

    /// Finishes the report with the given collection time.
    pub fn build_at(self, timestamp: i64) -> StatisticsRequest {
        StatisticsRequest {
            timestamp,
            client_attributes: self.attributes,
            metrics_blob: self.metrics_blob,
        }
    }

    /// Finishes the report stamped with the current time.
    pub fn build(self) -> StatisticsRequest {
        self.build_at(now_millis())
    }
}

fn escape_into(out: &mut String, raw: &str) {
    for c in raw.chars() {
        if matches!(c, '=' | '.' | ',' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Sends a statistics report on `connection`.
pub async fn publish<T>(
    transport: &T,
    connection: ConnectionId,
    report: StatisticsRequest,
) -> Result<()>
where
    T: Transport + ?Sized,
{
    let mut request = client_statistics::encode_request(&report)?;
    request.set_correlation_id(next_correlation_id())?;
    let response = transport.send(connection, request).await?;
    client_statistics::decode_response(&response)?;
    tracing::trace!(connection = %connection, "statistics published");
    Ok(())
}

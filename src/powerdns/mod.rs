//! PowerDNS HTTP API access.
//!
//! [`ZoneApi`] is the surface the orchestrators in [`crate::records`] and
//! [`crate::zones`] depend on; [`client::PowerDnsClient`] is the HTTP
//! implementation.

pub mod client;
pub mod types;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use types::{PdnsRrset, PdnsZone, PdnsZoneCreate};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("PowerDNS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("PowerDNS {operation} failed with {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
}

impl UpstreamError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Request(err) => err.status(),
            UpstreamError::Status { status, .. } => Some(*status),
        }
    }

    /// Transport failures and 5xx answers: the authority could not serve us.
    pub fn is_unavailable(&self) -> bool {
        match self {
            UpstreamError::Request(err) => !err.is_decode(),
            UpstreamError::Status { status, .. } => status.is_server_error(),
        }
    }
}

/// Zone-level operations against the authoritative server.
///
/// A 404 from the authority is reported through the `Ok` value (`None` /
/// `false`), never as an error.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    async fn list_zones(&self) -> Result<Vec<PdnsZone>, UpstreamError>;

    async fn get_zone(&self, name: &str) -> Result<Option<PdnsZone>, UpstreamError>;

    async fn create_zone(&self, zone: &PdnsZoneCreate) -> Result<PdnsZone, UpstreamError>;

    /// Returns `false` when the zone does not exist.
    async fn delete_zone(&self, name: &str) -> Result<bool, UpstreamError>;

    /// Apply all directives in a single PATCH. Returns `false` when the zone
    /// does not exist.
    async fn patch_rrsets(&self, zone: &str, rrsets: &[PdnsRrset]) -> Result<bool, UpstreamError>;
}

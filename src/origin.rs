//! Extractor describing who issued an administrative request.
use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

pub const ACTOR_HEADER: &str = "x-actor-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Actor id and client address recorded in activity log entries.
///
/// The actor comes from the `X-Actor-Id` header and defaults to `anonymous`;
/// the address is the first `X-Forwarded-For` hop, else the peer address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub actor_id: String,
    pub source_address: Option<String>,
}

impl RequestOrigin {
    pub fn new(actor_id: impl Into<String>, source_address: Option<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            source_address,
        }
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = header_value(parts, ACTOR_HEADER)
            .unwrap_or("anonymous")
            .to_string();
        let forwarded = header_value(parts, FORWARDED_FOR_HEADER)
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(RequestOrigin {
            actor_id,
            source_address: forwarded.or(peer),
        })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

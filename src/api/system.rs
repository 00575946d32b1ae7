use std::collections::BTreeMap;

use axum::{Extension, Json, http::StatusCode};
use serde::Serialize;

use super::{ApiResponse, ApiResult};
use crate::SharedState;
use crate::db;
use crate::powerdns::types::PdnsServerInfo;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub backend: bool,
    pub local_store: bool,
    pub upstream: bool,
    pub details: BTreeMap<&'static str, String>,
}

// GET /api/health
pub async fn health(
    Extension(state): Extension<SharedState>,
) -> (StatusCode, Json<ApiResponse<HealthReport>>) {
    let mut details = BTreeMap::new();
    details.insert("backend", "Backend server is running.".to_string());

    let local_store = match db::ping(&state.db).await {
        Ok(()) => {
            details.insert("localStore", "Local store reachable.".to_string());
            true
        }
        Err(err) => {
            details.insert("localStore", format!("Local store unreachable: {err}"));
            false
        }
    };

    let upstream = match state.pdns.server_info().await {
        Ok(_) => {
            details.insert("upstream", "PowerDNS reachable.".to_string());
            true
        }
        Err(err) => {
            details.insert("upstream", format!("PowerDNS unreachable: {err}"));
            false
        }
    };

    let report = HealthReport {
        backend: true,
        local_store,
        upstream,
        details,
    };
    let healthy = report.backend && report.local_store && report.upstream;
    let (status, message) = if healthy {
        (StatusCode::OK, "All systems operational.")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Some systems are down.")
    };

    let mut body = ApiResponse::ok(message, report);
    body.status = healthy;
    (status, Json(body))
}

// GET /api/server-status
pub async fn server_status(Extension(state): Extension<SharedState>) -> ApiResult<PdnsServerInfo> {
    let info = state.pdns.server_info().await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "PowerDNS server status fetched successfully.",
            info,
        )),
    ))
}

use axum::{Extension, Json, extract::Path, http::StatusCode};

use super::{ApiResponse, ApiResult};
use crate::error::AppError;
use crate::powerdns::types::PdnsStatistic;
use crate::stats::{self, ZoneStatsSummary};
use crate::zones::normalized_zone;
use crate::SharedState;

// GET /api/stats/zone/{zone}
pub async fn zone_stats(
    Extension(state): Extension<SharedState>,
    Path(zone): Path<String>,
) -> ApiResult<ZoneStatsSummary> {
    let zone = normalized_zone(&zone)?;
    let summary = stats::zone_last_24h(&state.db, &zone)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No statistics found for zone '{zone}' in the last 24 hours."
            ))
        })?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("Statistics for zone '{zone}' over the last 24 hours."),
            summary,
        )),
    ))
}

// GET /api/stats/global
pub async fn global_stats(Extension(state): Extension<SharedState>) -> ApiResult<Vec<PdnsStatistic>> {
    let statistics = state.pdns.statistics().await?;
    let count = statistics.len();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("PowerDNS statistics fetched successfully.", statistics).with_count(count)),
    ))
}

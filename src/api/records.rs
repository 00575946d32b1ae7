//! Record endpoints. Each successful operation adds one stats observation.
use axum::{Extension, Json, http::StatusCode};
use tracing::warn;

use super::{ApiResponse, ApiResult};
use crate::error::AppError;
use crate::powerdns::types::PdnsRrset;
use crate::records::{AddRecord, RecordKey, RecordOutcome, RecordQuery, RecordReconciler, UpdateRecord};
use crate::validation::normalized_zone;
use crate::{SharedState, stats};

fn zone_not_found(zone: &str) -> AppError {
    AppError::not_found(format!("Zone '{zone}' not found in PowerDNS."))
}

/// Stats are a side effect of a change that already happened upstream. The
/// bucket is keyed by the same normalized name the reconciler used.
pub(crate) async fn observe(state: &SharedState, zone: &str, reconciler: &RecordReconciler<'_>) {
    let Ok(zone) = normalized_zone(zone) else {
        return;
    };
    let elapsed = reconciler.upstream_elapsed();
    if let Err(err) = stats::record_observation(&state.db, &zone, elapsed).await {
        warn!(zone = %zone, "failed to record zone stats: {err:#}");
    }
}

// POST /api/add-record
pub async fn add_record(
    Extension(state): Extension<SharedState>,
    Json(req): Json<AddRecord>,
) -> ApiResult<PdnsRrset> {
    let reconciler = RecordReconciler::from_state(&state);
    let outcome = reconciler.add(&req).await?;

    match outcome {
        RecordOutcome::Found(rrset) => {
            observe(&state, &req.zone, &reconciler).await;
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok("Record added successfully.", rrset)),
            ))
        }
        RecordOutcome::ZoneNotFound | RecordOutcome::RecordNotFound => Err(zone_not_found(&req.zone)),
    }
}

// POST /api/get-recordbyfilter
pub async fn get_records(
    Extension(state): Extension<SharedState>,
    Json(query): Json<RecordQuery>,
) -> ApiResult<Vec<PdnsRrset>> {
    let reconciler = RecordReconciler::from_state(&state);
    let outcome = reconciler.get(&query).await?;

    let RecordOutcome::Found(rrsets) = outcome else {
        return Err(zone_not_found(&query.zone));
    };
    observe(&state, &query.zone, &reconciler).await;

    if rrsets.is_empty() {
        return Err(AppError::not_found(
            "No record found for the given zone/criteria.",
        ));
    }
    let count = rrsets.len();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Record(s) found.", rrsets).with_count(count)),
    ))
}

// POST /api/update-record
pub async fn update_record(
    Extension(state): Extension<SharedState>,
    Json(req): Json<UpdateRecord>,
) -> ApiResult<Vec<PdnsRrset>> {
    let reconciler = RecordReconciler::from_state(&state);
    let outcome = reconciler.update(&req).await?;

    let RecordOutcome::Found(applied) = outcome else {
        return Err(zone_not_found(&req.zone));
    };
    observe(&state, &req.zone, &reconciler).await;

    let message = if applied.len() > 1 {
        "Record renamed and updated successfully."
    } else {
        "Record updated successfully."
    };
    Ok((StatusCode::OK, Json(ApiResponse::ok(message, applied))))
}

// POST /api/delete-record
pub async fn delete_record(
    Extension(state): Extension<SharedState>,
    Json(key): Json<RecordKey>,
) -> ApiResult<PdnsRrset> {
    let reconciler = RecordReconciler::from_state(&state);
    let outcome = reconciler.delete(&key).await?;

    match outcome {
        RecordOutcome::Found(removed) => {
            observe(&state, &key.zone, &reconciler).await;
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok("Record deleted successfully.", removed)),
            ))
        }
        RecordOutcome::ZoneNotFound => Err(zone_not_found(&key.zone)),
        RecordOutcome::RecordNotFound => Err(AppError::not_found(format!(
            "Record '{}' of type '{}' not found in zone '{}'.",
            key.record_name, key.rtype, key.zone
        ))),
    }
}

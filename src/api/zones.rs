//! Zone endpoints: thin wrappers around [`ZoneLifecycleManager`].
use std::collections::BTreeMap;

use axum::{Extension, Json, extract::Query, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::records::observe;
use super::{ApiResponse, ApiResult};
use crate::error::AppError;
use crate::origin::RequestOrigin;
use crate::powerdns::types::{PdnsRrset, PdnsZone};
use crate::records::{RecordOutcome, RecordReconciler};
use crate::validation::ZoneKind;
use crate::zones::{CreateZone, CreateZoneOutcome, DeleteZoneOutcome, ZoneLifecycleManager};
use crate::SharedState;

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneNameParams {
    pub zone_name: String,
}

// POST /api/create-zone
pub async fn create_zone(
    Extension(state): Extension<SharedState>,
    origin: RequestOrigin,
    Json(req): Json<CreateZone>,
) -> ApiResult<PdnsZone> {
    match ZoneLifecycleManager::from_state(&state)
        .create(&req, &origin)
        .await?
    {
        CreateZoneOutcome::Created(zone) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok(
                format!("Zone '{}' created successfully.", zone.name),
                zone,
            )),
        )),
        CreateZoneOutcome::ExistsUpstream(name) => Err(AppError::conflict(format!(
            "Zone '{name}' already exists in PowerDNS."
        ))),
        CreateZoneOutcome::ExistsLocally(name) => Err(AppError::conflict(format!(
            "Zone '{name}' already exists in local metadata."
        ))),
    }
}

// GET /api/get-zone?zoneName=
pub async fn get_zone(
    Extension(state): Extension<SharedState>,
    Query(params): Query<ZoneNameParams>,
) -> ApiResult<PdnsZone> {
    let zone = ZoneLifecycleManager::from_state(&state)
        .get(&params.zone_name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Zone '{}' not found.", params.zone_name)))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("Zone '{}' fetched successfully.", zone.name),
            zone,
        )),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedZone {
    pub zone_name: String,
    pub meta_deleted: bool,
}

// DELETE /api/delete-zone
pub async fn delete_zone(
    Extension(state): Extension<SharedState>,
    origin: RequestOrigin,
    Json(params): Json<ZoneNameParams>,
) -> ApiResult<DeletedZone> {
    match ZoneLifecycleManager::from_state(&state)
        .delete(&params.zone_name, &origin)
        .await?
    {
        DeleteZoneOutcome::Deleted { metadata_removed } => Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(
                format!(
                    "Zone '{}' deleted successfully from PowerDNS and local metadata.",
                    params.zone_name
                ),
                DeletedZone {
                    zone_name: params.zone_name,
                    meta_deleted: metadata_removed,
                },
            )),
        )),
        DeleteZoneOutcome::NotFound => Err(AppError::not_found(format!(
            "Zone '{}' not found in PowerDNS.",
            params.zone_name
        ))),
    }
}

// GET /api/list-zones
pub async fn list_zones(Extension(state): Extension<SharedState>) -> ApiResult<Vec<PdnsZone>> {
    let zones = ZoneLifecycleManager::from_state(&state).list().await?;
    if zones.is_empty() {
        return Err(AppError::not_found("No DNS zones found."));
    }

    let count = zones.len();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Zones fetched successfully.", zones).with_count(count)),
    ))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ImportZoneRequest {
    pub domain: String,
    /// Record type to contents, e.g. `{"A": ["192.0.2.1"], "MX": ["mail.example.com"]}`.
    pub records: BTreeMap<String, Vec<String>>,
}

// POST /api/import-zone
pub async fn import_zone(
    Extension(state): Extension<SharedState>,
    origin: RequestOrigin,
    Json(req): Json<ImportZoneRequest>,
) -> ApiResult<Vec<PdnsRrset>> {
    let manager = ZoneLifecycleManager::from_state(&state);
    if manager.get(&req.domain).await?.is_none() {
        let create = CreateZone {
            name: req.domain.clone(),
            kind: Some(ZoneKind::Native.to_string()),
            nameservers: state.config.default_nameservers.clone(),
            ..Default::default()
        };
        match manager.create(&create, &origin).await? {
            CreateZoneOutcome::Created(zone) => info!(zone = %zone.name, "zone created for import"),
            CreateZoneOutcome::ExistsUpstream(name) | CreateZoneOutcome::ExistsLocally(name) => {
                warn!(zone = %name, "importing into an existing zone");
            }
        }
    }

    if req.records.values().all(Vec::is_empty) {
        return Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(
                "Zone ready (no records imported).",
                Vec::new(),
            )),
        ));
    }

    let reconciler = RecordReconciler::from_state(&state);
    let outcome = reconciler.import(&req.domain, &req.records).await?;
    let RecordOutcome::Found(imported) = outcome else {
        return Err(AppError::not_found(format!(
            "Zone '{}' not found in PowerDNS.",
            req.domain
        )));
    };
    observe(&state, &req.domain, &reconciler).await;

    let count = imported.len();
    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::ok("DNS records imported successfully.", imported).with_count(count),
        ),
    ))
}

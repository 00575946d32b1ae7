//! Zone creation and deletion: PowerDNS first, then local metadata and the
//! activity log.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::AppState;
use crate::db::{Db, activity_repo, zone_meta_repo};
use crate::origin::RequestOrigin;
use crate::powerdns::types::{PdnsZone, PdnsZoneCreate};
use crate::powerdns::{UpstreamError, ZoneApi};
pub use crate::validation::normalized_zone;
use crate::validation::{ValidationError, validate_zone_kind, validate_zone_topology};

pub const ACTION_CREATE_ZONE: &str = "CREATE_ZONE";
pub const ACTION_DELETE_ZONE: &str = "DELETE_ZONE";

#[derive(Debug, Error)]
pub enum ZoneError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("local store error: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateZone {
    pub name: String,
    pub kind: Option<String>,
    pub masters: Vec<String>,
    pub nameservers: Vec<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug)]
pub enum CreateZoneOutcome {
    Created(PdnsZone),
    /// PowerDNS already hosts the zone; nothing was written locally.
    ExistsUpstream(String),
    /// Local metadata already exists for the zone.
    ExistsLocally(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteZoneOutcome {
    Deleted { metadata_removed: bool },
    NotFound,
}

pub struct ZoneLifecycleManager<'a> {
    api: &'a dyn ZoneApi,
    db: &'a Db,
}

impl<'a> ZoneLifecycleManager<'a> {
    pub fn new(api: &'a dyn ZoneApi, db: &'a Db) -> Self {
        Self { api, db }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pdns, &state.db)
    }

    pub async fn create(
        &self,
        req: &CreateZone,
        origin: &RequestOrigin,
    ) -> Result<CreateZoneOutcome, ZoneError> {
        let name = normalized_zone(&req.name)?;
        let kind = validate_zone_kind(req.kind.as_deref())?;
        validate_zone_topology(kind, &req.masters, &req.nameservers)?;

        if zone_meta_repo::exists(self.db, &name).await? {
            warn!(zone = %name, "zone metadata already exists");
            return Ok(CreateZoneOutcome::ExistsLocally(name));
        }
        if self.api.get_zone(&name).await?.is_some() {
            warn!(zone = %name, "zone already exists in PowerDNS");
            return Ok(CreateZoneOutcome::ExistsUpstream(name));
        }

        let payload = PdnsZoneCreate {
            name: name.clone(),
            kind: kind.to_string(),
            masters: req.masters.clone(),
            nameservers: req.nameservers.clone(),
        };
        let zone = match self.api.create_zone(&payload).await {
            Ok(zone) => zone,
            Err(err) if err.status() == Some(StatusCode::CONFLICT) => {
                warn!(zone = %name, "PowerDNS reported the zone as existing");
                return Ok(CreateZoneOutcome::ExistsUpstream(name));
            }
            Err(err) => return Err(err.into()),
        };

        let tags = dedup_tags(&req.tags);
        let description = req.description.as_deref().unwrap_or_default();
        let inserted = zone_meta_repo::insert(
            self.db,
            &zone_meta_repo::NewZoneMeta {
                zone_name: &name,
                owner: req.owner.as_deref(),
                description,
                tags: &tags,
                synced_with_pdns: true,
            },
        )
        .await;
        let meta_id = match inserted {
            Ok(id) => id,
            Err(err)
                if err
                    .as_database_error()
                    .is_some_and(|e| e.is_unique_violation()) =>
            {
                warn!(zone = %name, "zone created in PowerDNS but metadata was written concurrently");
                return Ok(CreateZoneOutcome::ExistsLocally(name));
            }
            Err(err) => return Err(err.into()),
        };

        let details = json!({
            "kind": kind,
            "masters": req.masters,
            "nameservers": req.nameservers,
            "description": description,
            "tags": tags,
            "zoneMetaId": meta_id,
        });
        self.log_activity(origin, ACTION_CREATE_ZONE, &name, &details)
            .await;

        info!(zone = %name, %kind, "zone created");
        Ok(CreateZoneOutcome::Created(zone))
    }

    pub async fn delete(
        &self,
        name: &str,
        origin: &RequestOrigin,
    ) -> Result<DeleteZoneOutcome, ZoneError> {
        let name = normalized_zone(name)?;

        if !self.api.delete_zone(&name).await? {
            return Ok(DeleteZoneOutcome::NotFound);
        }

        let metadata_removed = zone_meta_repo::delete(self.db, &name).await?;
        let details = json!({
            "from": "PowerDNS + local store",
            "metaDeleted": metadata_removed,
        });
        self.log_activity(origin, ACTION_DELETE_ZONE, &name, &details)
            .await;

        info!(zone = %name, metadata_removed, "zone deleted");
        Ok(DeleteZoneOutcome::Deleted { metadata_removed })
    }

    pub async fn get(&self, name: &str) -> Result<Option<PdnsZone>, ZoneError> {
        let name = normalized_zone(name)?;
        Ok(self.api.get_zone(&name).await?)
    }

    pub async fn list(&self) -> Result<Vec<PdnsZone>, ZoneError> {
        Ok(self.api.list_zones().await?)
    }

    // The upstream change already happened; a lost audit row is logged, not returned.
    async fn log_activity(
        &self,
        origin: &RequestOrigin,
        action: &str,
        target: &str,
        details: &serde_json::Value,
    ) {
        if let Err(err) = activity_repo::append(
            self.db,
            &origin.actor_id,
            action,
            Some(target),
            details,
            origin.source_address.as_deref(),
        )
        .await
        {
            warn!(zone = target, action, "failed to append activity log entry: {err}");
        }
    }
}

fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

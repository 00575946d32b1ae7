pub mod records;
pub mod stats;
pub mod system;
pub mod zones;

use axum::{
    Extension, Json, Router,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::SharedState;
use crate::error::AppError;

/// Envelope shared by every administrative response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            count: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            count: None,
            data: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub fn create_router(state: SharedState) -> Router {
    use crate::api::{records, stats, system, zones};

    Router::new()
        // system
        .route("/api/health", get(system::health))
        .route("/api/server-status", get(system::server_status))
        // zones
        .route("/api/create-zone", post(zones::create_zone))
        .route("/api/get-zone", get(zones::get_zone))
        .route("/api/delete-zone", delete(zones::delete_zone))
        .route("/api/list-zones", get(zones::list_zones))
        .route("/api/import-zone", post(zones::import_zone))
        // records
        .route("/api/add-record", post(records::add_record))
        .route("/api/get-recordbyfilter", post(records::get_records))
        .route("/api/update-record", post(records::update_record))
        .route("/api/delete-record", post(records::delete_record))
        // stats
        .route("/api/stats/zone/{zone}", get(stats::zone_stats))
        .route("/api/stats/global", get(stats::global_stats))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

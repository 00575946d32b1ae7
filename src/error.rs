// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::api::ApiResponse;
use crate::powerdns::UpstreamError;
use crate::records::RecordError;
use crate::validation::ValidationError;
use crate::zones::ZoneError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("PowerDNS unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("PowerDNS rejected the request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    #[error(
        "rename of '{old_name}' to '{new_name}' in zone '{zone}' partially failed: \
         the old record was deleted but the new record could not be created ({cause})"
    )]
    PartialRename {
        zone: String,
        old_name: String,
        new_name: String,
        cause: String,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamRejected { .. } | AppError::PartialRename { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        if err.is_unavailable() {
            return AppError::UpstreamUnavailable(err.to_string());
        }
        match err {
            UpstreamError::Status { status, body, .. } => AppError::UpstreamRejected {
                status: status.as_u16(),
                message: body,
            },
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Validation(err) => AppError::Validation(err),
            RecordError::Upstream(err) => err.into(),
            RecordError::PartialRename {
                zone,
                old_name,
                new_name,
                source,
            } => AppError::PartialRename {
                zone,
                old_name,
                new_name,
                cause: source.to_string(),
            },
        }
    }
}

impl From<ZoneError> for AppError {
    fn from(err: ZoneError) -> Self {
        match err {
            ZoneError::Validation(err) => AppError::Validation(err),
            ZoneError::Upstream(err) => err.into(),
            ZoneError::Store(err) => err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AppError::Internal(err) = &self {
            error!("internal error: {err:#}");
        }

        let body = Json(ApiResponse::<()>::failure(self.to_string()));
        (status, body).into_response()
    }
}

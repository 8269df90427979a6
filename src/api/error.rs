//! API error types and conversions (§7).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    InvalidRequest(String),
    Conflict,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "missing or invalid authentication".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "token does not match the target project".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                "update lost a concurrency race, retry the request".to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<crate::ingest::IngestError> for ApiError {
    fn from(err: crate::ingest::IngestError) -> Self {
        use crate::ingest::IngestError;
        match err {
            IngestError::Unauthorized => ApiError::Unauthorized,
            IngestError::Forbidden => ApiError::Forbidden,
            IngestError::NotFound(msg) => ApiError::NotFound(msg),
            IngestError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            IngestError::Conflict => ApiError::Conflict,
            IngestError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<crate::registrar::RegistrarError> for ApiError {
    fn from(err: crate::registrar::RegistrarError) -> Self {
        use crate::registrar::RegistrarError;
        match err {
            RegistrarError::Forbidden => ApiError::Forbidden,
            RegistrarError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            RegistrarError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

//! Shared HTTP helpers: bearer-token extraction accepting both the canonical `Authorization:
//! Bearer <token>` header and the legacy `X-Project-Token` header (§6.1), plus a `Json` extractor
//! that reports malformed bodies as `400` rather than axum's default `422` (§6.1/§6.2).

use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get("X-Project-Token")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// `axum::Json<T>` that maps every deserialization failure (missing field, wrong type, invalid
/// JSON, wrong content-type) to `ApiError::InvalidRequest`, so a malformed pulse/config body
/// surfaces as the `400` the taxonomy promises instead of axum's default `422`/`415`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(ApiError::InvalidRequest(rejection.to_string())),
        }
    }
}

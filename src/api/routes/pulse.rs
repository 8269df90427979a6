//! `POST /api/pulse` (§6.1): the wire boundary over [`crate::ingest::Ingestor`].

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::ApiState;
use crate::api::types::{PulseBody, PulseResponse, PulseStatus};
use crate::api::utils::{extract_token, ValidatedJson};
use crate::ingest::PulseRequest;

/// POST /api/pulse
pub async fn pulse(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<PulseBody>,
) -> ApiResult<Json<PulseResponse>> {
    let token = extract_token(&headers).ok_or(ApiError::Unauthorized)?;

    if body.check_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("check_name must not be empty".to_string()));
    }

    let request = PulseRequest {
        token,
        project_id: body.project_id,
        check_name: body.check_name,
        status_ok: !matches!(body.status, Some(PulseStatus::Error)),
        message: body.message,
        latency: body.latency,
    };

    let outcome = state.ingestor.ingest(request).await?;

    Ok(Json(PulseResponse {
        success: true,
        check_id: outcome.check_id,
        status: outcome.status,
        timestamp: outcome.timestamp,
    }))
}

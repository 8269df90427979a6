//! Process liveness endpoint (§6.7). Deliberately makes no Store call -- this proves the HTTP
//! process is up, not that the sweeper tick ran (that's the self-health check, §4.3).

use axum::Json;
use serde_json::{json, Value};

/// GET /api/health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

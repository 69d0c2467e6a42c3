//! Liveness probe.

use axum::Json;

/// GET /api/ping
pub async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

//! Scan trigger and progress polling.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use tracing::info;

use filedeck_core::error::AppError;
use filedeck_index::{ScanState, ScanStatus};

use crate::dto::request::ScanQuery;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/scan
pub async fn start_scan(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ScanQuery>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let raw = query.path.unwrap_or_default();
    let target = state.resolver.resolve(&raw).await?;

    let meta = tokio::fs::metadata(&target.abs)
        .await
        .map_err(AppError::from)?;
    if !meta.is_dir() {
        return Err(AppError::validation("Scan target is not a directory").into());
    }

    let (_job, started) = state.scanner.start(&target);
    let status = if started {
        "scan started"
    } else {
        "scan already running"
    };
    info!(path = %target.rel, status, "Scan requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": status, "path": target.rel })),
    ))
}

/// GET /api/scan_status
pub async fn scan_status(State(state): State<AppState>) -> Json<ScanStatus> {
    let mut status = state.scans.status();

    // Listings produced on demand (without an explicit scan) still count.
    if status.status == ScanState::Idle {
        let totals = state.index.totals();
        status.num_files = totals.files;
        status.num_folders = totals.directories;
    }

    Json(status)
}

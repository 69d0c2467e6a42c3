//! Share lifecycle and public (token-authenticated) share access.

use axum::body::Body;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use axum::{Form, Json};
use tokio_util::io::ReaderStream;
use tracing::info;

use filedeck_auth::rbac::{Capability, require};
use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_index::resolver::ResolvedPath;
use filedeck_share::model::ShareLink;
use filedeck_transfer::{CancelGuard, FileSlice, ZipLimits, spool_archive};

use crate::dto::request::{
    CreateShareParams, FolderDownloadParams, ShareBrowseForm, ShareDownloadParams,
    SharePasswordForm, validated,
};
use crate::dto::response::{ShareCreatedResponse, ShareSummary, SharedItemResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::folder::page_entries;
use crate::state::AppState;

/// POST /api/share
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CreateShareParams>,
) -> ApiResult<Json<ShareCreatedResponse>> {
    require(auth.role, Capability::Share)?;
    let params = validated(params)?;

    let target = state.resolver.resolve(&params.path).await?;
    // Shares may only be created for paths that exist right now.
    tokio::fs::metadata(&target.abs)
        .await
        .map_err(AppError::from)?;

    let password_hash = match params.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(state.hasher.hash_password(password)?),
        None => None,
    };

    let share = state
        .shares
        .create(&target.rel, password_hash, params.expires_in, &auth.username)
        .await?;

    Ok(Json(ShareCreatedResponse {
        share_url: format!("/api/share/{}", share.token),
        token: share.token.clone(),
        path: share.path.clone(),
        expires_at: share.expires_at,
        password_required: share.has_password(),
    }))
}

/// GET /api/shares
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<Vec<ShareSummary>> {
    let shares = state.shares.list_for(auth.user());
    Json(shares.iter().map(ShareSummary::from).collect())
}

/// DELETE /api/share/{token}
pub async fn delete_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let share = state.shares.delete(&token, auth.user()).await?;
    info!(path = %share.path, by = %auth.username, "Share revoked");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /api/share/{token}
///
/// Public entry point: the token (plus password, when set) is the whole
/// credential. The body is optional so unprotected links work with a
/// bare POST.
pub async fn resolve_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
    form: Result<Form<SharePasswordForm>, FormRejection>,
) -> ApiResult<Json<SharedItemResponse>> {
    let password = form.ok().and_then(|Form(f)| f.password);
    let share = state.share_access.resolve(&token, password.as_deref())?;

    let target = state.resolver.resolve(&share.path).await?;
    let meta = tokio::fs::metadata(&target.abs)
        .await
        .map_err(AppError::from)?;

    let view = if meta.is_dir() {
        folder_view(&state, &share, &target).await?
    } else {
        SharedItemResponse::file(&share, target.rel, meta.len())
    };
    Ok(Json(view))
}

/// POST /api/share/{token}/browse
pub async fn browse_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ShareBrowseForm>,
) -> ApiResult<Json<SharedItemResponse>> {
    let form = validated(form)?;
    // Token and password are re-checked on every call; one successful
    // resolve does not open the rest of the tree.
    let share = state.share_access.resolve(&token, form.password.as_deref())?;

    let base = state.resolver.resolve(&share.path).await?;
    let target = state.resolver.resolve_within(&base, &form.path).await?;

    let view = folder_view(&state, &share, &target).await?;
    Ok(Json(view))
}

/// GET /api/share/{token}/download
pub async fn download_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ShareDownloadParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let share = state.share_access.resolve(&token, params.password.as_deref())?;
    let base = state.resolver.resolve(&share.path).await?;

    let target = match params.file.as_deref().filter(|f| !f.is_empty()) {
        Some(file) => state.resolver.resolve_within(&base, file).await?,
        None => base,
    };

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let slice = FileSlice::open(&target.abs, range).await?;

    info!(path = %target.rel, partial = slice.is_partial(), "Share file download");
    Ok(file_response(slice)?)
}

/// GET /api/share/{token}/download-folder
pub async fn download_share_folder(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<FolderDownloadParams>,
) -> ApiResult<Response> {
    let share = state.share_access.resolve(&token, params.password.as_deref())?;
    let base = state.resolver.resolve(&share.path).await?;

    let target = match params.path.as_deref().filter(|p| !p.is_empty()) {
        Some(sub) => state.resolver.resolve_within(&base, sub).await?,
        None => base,
    };

    // Dropping the guard (client gone) aborts the spool at the next entry.
    let (_guard, cancel) = CancelGuard::new();
    let limits = ZipLimits::from(&state.config.transfer);
    let archive = spool_archive(target.abs.clone(), limits, cancel).await?;

    let stem = if target.rel.is_empty() {
        "root"
    } else {
        target.name()
    };
    info!(path = %target.rel, size = archive.size, "Share folder download");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_LENGTH, archive.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{stem}.zip\""),
        )
        .body(Body::from_stream(ReaderStream::new(archive.file)))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// Folder view of a share target, listing every entry (no pagination on
/// the share surface).
async fn folder_view(
    state: &AppState,
    share: &ShareLink,
    target: &ResolvedPath,
) -> AppResult<SharedItemResponse> {
    let listing = state.scanner.listing(target).await?;
    let entries = page_entries(state, &listing, &target.rel, 0, usize::MAX);
    Ok(SharedItemResponse::folder(
        share,
        target.rel.clone(),
        entries,
    ))
}

/// Builds a streaming 200/206 response for an opened file slice.
fn file_response(slice: FileSlice) -> AppResult<Response> {
    let status = if slice.is_partial() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, slice.content_type.as_str())
        .header(header::CONTENT_LENGTH, slice.content_length())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", slice.file_name),
        );
    if let Some(content_range) = slice.content_range() {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(slice.reader)))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

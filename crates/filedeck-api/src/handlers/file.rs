//! Destructive file operations — delete and rename.

use axum::Json;
use axum::extract::{Query, State};
use tracing::info;

use filedeck_auth::rbac::{Capability, require};
use filedeck_core::error::AppError;
use filedeck_index::resolver::join_rel;

use crate::dto::request::{DeleteParams, RenameParams, validated};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// DELETE /api/file
pub async fn delete_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<serde_json::Value>> {
    require(auth.role, Capability::Delete)?;
    let params = validated(params)?;

    let target = state.resolver.resolve(&params.path).await?;
    if target.is_root() {
        return Err(AppError::validation("The root folder cannot be deleted").into());
    }

    let meta = tokio::fs::symlink_metadata(&target.abs)
        .await
        .map_err(AppError::from)?;
    if meta.is_dir() {
        tokio::fs::remove_dir_all(&target.abs)
            .await
            .map_err(AppError::from)?;
        state.index.remove_subtree(&target.rel);
    } else {
        tokio::fs::remove_file(&target.abs)
            .await
            .map_err(AppError::from)?;
    }
    // The parent listing refreshes itself on its next read (mtime changed).

    info!(path = %target.rel, by = %auth.username, "Deleted");
    Ok(Json(serde_json::json!({ "deleted": target.rel })))
}

/// PUT /api/file/rename
pub async fn rename_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RenameParams>,
) -> ApiResult<Json<serde_json::Value>> {
    require(auth.role, Capability::Rename)?;
    let params = validated(params)?;

    let new_name = params.new_name.trim();
    if new_name.is_empty()
        || new_name == "."
        || new_name == ".."
        || new_name.contains(['/', '\\', '\0'])
    {
        return Err(AppError::validation("Invalid new name").into());
    }

    let source = state.resolver.resolve(&params.old_path).await?;
    if source.is_root() {
        return Err(AppError::validation("The root folder cannot be renamed").into());
    }
    tokio::fs::symlink_metadata(&source.abs)
        .await
        .map_err(AppError::from)?;

    let parent_rel = source.rel.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
    let dest_rel = join_rel(parent_rel, new_name);
    let dest_abs = state.resolver.abs_of(&dest_rel);

    // fs::rename would silently replace an existing target.
    if tokio::fs::symlink_metadata(&dest_abs).await.is_ok() {
        return Err(AppError::conflict("An item with that name already exists").into());
    }

    tokio::fs::rename(&source.abs, &dest_abs)
        .await
        .map_err(AppError::from)?;
    state.index.remove_subtree(&source.rel);

    info!(from = %source.rel, to = %dest_rel, by = %auth.username, "Renamed");
    Ok(Json(
        serde_json::json!({ "renamed": source.rel, "to": dest_rel }),
    ))
}

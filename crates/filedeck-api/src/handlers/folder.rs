//! Directory listing.

use axum::Json;
use axum::extract::{Query, State};

use filedeck_index::entry::DirListing;
use filedeck_index::resolver::join_rel;

use crate::dto::request::{FolderQuery, validated};
use crate::dto::response::{FolderEntry, FolderResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Page size when the client does not ask for one.
const DEFAULT_PAGE_SIZE: usize = 200;

/// GET /api/folder
pub async fn list_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<FolderQuery>,
) -> ApiResult<Json<FolderResponse>> {
    let query = validated(query)?;

    let raw = query.path.unwrap_or_default();
    let target = state.resolver.resolve(&raw).await?;
    let listing = state.scanner.listing(&target).await?;

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let total = listing.len();

    let entries = page_entries(&state, &listing, &target.rel, offset, limit);
    let has_more = offset + entries.len() < total;

    Ok(Json(FolderResponse {
        path: target.rel,
        entries,
        total,
        offset,
        limit,
        has_more,
    }))
}

/// Maps one page of a listing to wire entries, pulling per-directory
/// child counts out of the index for the returned page only.
pub(crate) fn page_entries(
    state: &AppState,
    listing: &DirListing,
    base_rel: &str,
    offset: usize,
    limit: usize,
) -> Vec<FolderEntry> {
    listing
        .entries
        .iter()
        .skip(offset)
        .take(limit)
        .map(|entry| {
            let child_count = if entry.is_dir {
                state.index.child_count(&join_rel(base_rel, &entry.name))
            } else {
                None
            };
            FolderEntry::from_entry(entry, child_count)
        })
        .collect()
}

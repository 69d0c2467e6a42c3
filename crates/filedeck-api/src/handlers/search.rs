//! Index search.

use axum::Json;
use axum::extract::{Query, State};

use filedeck_index::resolver::in_subtree;

use crate::dto::request::{SearchQuery, validated};
use crate::dto::response::SearchResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Hit cap when the client does not ask for one.
const DEFAULT_SEARCH_LIMIT: usize = 100;

/// GET /api/search
pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let query = validated(query)?;
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let results = match query.path.as_deref().filter(|p| !p.is_empty()) {
        // Subtree filter: match everywhere, then keep hits under the base.
        Some(raw) => {
            let base = state.resolver.resolve(raw).await?;
            let mut hits = state.index.search(&query.q, usize::MAX);
            hits.retain(|hit| in_subtree(&hit.path, &base.rel));
            hits.truncate(limit);
            hits
        }
        None => state.index.search(&query.q, limit),
    };

    Ok(Json(SearchResponse { results }))
}

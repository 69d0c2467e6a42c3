//! Route definitions for the FileDeck HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request-log middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(folder_routes())
        .merge(scan_routes())
        .merge(search_routes())
        .merge(share_routes())
        .merge(file_routes())
        .merge(user_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Liveness probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/ping", get(handlers::health::ping))
}

/// Login and current-user profile
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/user/profile", get(handlers::auth::profile))
}

/// Directory listing
fn folder_routes() -> Router<AppState> {
    Router::new().route("/folder", get(handlers::folder::list_folder))
}

/// Scan trigger and progress polling
fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(handlers::scan::start_scan))
        .route("/scan_status", get(handlers::scan::scan_status))
}

/// Index search
fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(handlers::search::search))
}

/// Share lifecycle plus the public, token-authenticated share surface
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/share", post(handlers::share::create_share))
        .route("/shares", get(handlers::share::list_shares))
        .route(
            "/share/{token}",
            post(handlers::share::resolve_share).delete(handlers::share::delete_share),
        )
        .route(
            "/share/{token}/browse",
            post(handlers::share::browse_share),
        )
        .route(
            "/share/{token}/download",
            get(handlers::share::download_share),
        )
        .route(
            "/share/{token}/download-folder",
            get(handlers::share::download_share_folder),
        )
}

/// Delete and rename
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/file", delete(handlers::file::delete_path))
        .route("/file/rename", put(handlers::file::rename_path))
}

/// User management (admin)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{username}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
}

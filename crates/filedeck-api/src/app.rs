//! Application builder — wires router + middleware + state into an Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use filedeck_core::config::AppConfig;
use filedeck_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Constructs every shared component and assembles the application state.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    // ── Step 1: Data directory ───────────────────────────────────
    let data_dir = std::path::PathBuf::from(&config.storage.data_dir);
    tokio::fs::create_dir_all(&data_dir).await.map_err(|e| {
        AppError::storage(format!(
            "Failed to create data dir '{}': {e}",
            data_dir.display()
        ))
    })?;

    // ── Step 2: Resolver, index, scanner ─────────────────────────
    let resolver =
        Arc::new(filedeck_index::resolver::PathResolver::new(&config.scan.root).await?);
    let index = Arc::new(filedeck_index::index::DirectoryIndex::new());
    let scans = Arc::new(filedeck_index::scan::registry::ScanRegistry::new());
    let scanner = filedeck_index::scan::scanner::Scanner::new(
        Arc::clone(&resolver),
        Arc::clone(&index),
        Arc::clone(&scans),
    );

    // ── Step 3: Auth system ──────────────────────────────────────
    let hasher = Arc::new(filedeck_auth::password::PasswordHasher::new());
    let jwt_encoder = Arc::new(filedeck_auth::jwt::encoder::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(filedeck_auth::jwt::decoder::JwtDecoder::new(&config.auth));

    let users = Arc::new(
        filedeck_auth::user::store::UserStore::load(data_dir.join("users.json")).await?,
    );
    let admin_hash = hasher.hash_password(&config.auth.admin_password)?;
    users
        .ensure_admin(&config.auth.admin_username, admin_hash)
        .await?;

    // ── Step 4: Share registry ───────────────────────────────────
    let shares =
        Arc::new(filedeck_share::store::ShareStore::load(data_dir.join("shares.json")).await?);
    let share_access = Arc::new(filedeck_share::access::ShareAccess::new(
        Arc::clone(&shares),
        Arc::clone(&hasher),
    ));

    Ok(AppState {
        config: Arc::new(config),
        resolver,
        index,
        scans,
        scanner,
        jwt_encoder,
        jwt_decoder,
        hasher,
        users,
        shares,
        share_access,
    })
}

/// Runs the FileDeck server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileDeck server...");

    let state = build_state(config).await?;

    // ── Optional startup scan ────────────────────────────────────
    if state.config.scan.scan_on_startup {
        let (_job, started) = state.scanner.start(&state.resolver.root_path());
        if started {
            tracing::info!("Startup scan of the root triggered");
        }
    }

    // ── Build and start HTTP server ──────────────────────────────
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("FileDeck server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}

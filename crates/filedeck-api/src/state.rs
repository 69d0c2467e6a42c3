//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filedeck_auth::jwt::decoder::JwtDecoder;
use filedeck_auth::jwt::encoder::JwtEncoder;
use filedeck_auth::password::PasswordHasher;
use filedeck_auth::user::store::UserStore;
use filedeck_core::config::AppConfig;
use filedeck_index::index::DirectoryIndex;
use filedeck_index::resolver::PathResolver;
use filedeck_index::scan::registry::ScanRegistry;
use filedeck_index::scan::scanner::Scanner;
use filedeck_share::access::ShareAccess;
use filedeck_share::store::ShareStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Browsing ─────────────────────────────────────────────
    /// Client path resolution against the scan root
    pub resolver: Arc<PathResolver>,
    /// In-memory directory listings
    pub index: Arc<DirectoryIndex>,
    /// Scan job registry for status polling
    pub scans: Arc<ScanRegistry>,
    /// Background filesystem walker
    pub scanner: Scanner,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token encoder
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2id)
    pub hasher: Arc<PasswordHasher>,
    /// User account store
    pub users: Arc<UserStore>,

    // ── Shares ───────────────────────────────────────────────
    /// Share link store
    pub shares: Arc<ShareStore>,
    /// Public share token and password validation
    pub share_access: Arc<ShareAccess>,
}

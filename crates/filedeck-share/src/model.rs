//! Share link model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ad-hoc share: a token bound to a path under the scan root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    /// URL-safe random token; the only handle a recipient ever gets.
    pub token: String,
    /// Shared path relative to the scan root. May be a file or a folder.
    pub path: String,
    /// Argon2 hash of the access password, if one was set. Never leaves
    /// the server.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether `user` may revoke this share.
    pub fn deletable_by(&self, username: &str, is_admin: bool) -> bool {
        is_admin || self.created_by == username
    }
}

//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use filedeck_auth::user::model::User;
use filedeck_auth::user::role::UserRole;
use filedeck_index::entry::Entry;
use filedeck_index::index::SearchHit;
use filedeck_share::model::ShareLink;

/// The authenticated identity, as returned by login and profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    /// Username.
    pub username: String,
    /// Role name.
    pub role: UserRole,
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Bearer access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// The logged-in identity.
    pub user: ProfileResponse,
}

/// One entry of a directory listing, enriched with index knowledge
/// about sub-folder contents.
#[derive(Debug, Clone, Serialize)]
pub struct FolderEntry {
    /// Entry name.
    pub name: String,
    /// Whether this is a directory.
    pub is_dir: bool,
    /// File size in bytes; absent for directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time, when the filesystem reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Whether the entry is a directory with at least one known child.
    pub has_children: bool,
    /// Number of direct children; present once the directory has been
    /// scanned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

impl FolderEntry {
    /// Builds the wire entry from an indexed one. `child_count` is the
    /// index's knowledge of the sub-directory, `None` when unscanned or
    /// for files.
    pub fn from_entry(entry: &Entry, child_count: Option<usize>) -> Self {
        Self {
            name: entry.name.clone(),
            is_dir: entry.is_dir,
            size: entry.size,
            modified: entry.modified,
            has_children: entry.is_dir && child_count.is_some_and(|c| c > 0),
            child_count: if entry.is_dir { child_count } else { None },
        }
    }
}

/// Directory listing page.
#[derive(Debug, Clone, Serialize)]
pub struct FolderResponse {
    /// Root-relative path of the listed directory ("" is the root).
    pub path: String,
    /// Entries of this page, directories first.
    pub entries: Vec<FolderEntry>,
    /// Total number of entries in the directory.
    pub total: usize,
    /// Offset of the first returned entry.
    pub offset: usize,
    /// Requested page size.
    pub limit: usize,
    /// Whether entries beyond this page exist.
    pub has_more: bool,
}

/// Search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Matching entries ordered by path.
    pub results: Vec<SearchHit>,
}

/// Response to share creation.
#[derive(Debug, Clone, Serialize)]
pub struct ShareCreatedResponse {
    /// Public URL path of the share.
    pub share_url: String,
    /// The share token.
    pub token: String,
    /// Shared path, root-relative.
    pub path: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Whether a password gates access.
    pub password_required: bool,
}

/// One share in the owner/admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct ShareSummary {
    pub token: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub has_password: bool,
}

impl From<&ShareLink> for ShareSummary {
    fn from(share: &ShareLink) -> Self {
        Self {
            token: share.token.clone(),
            path: share.path.clone(),
            expires_at: share.expires_at,
            created_at: share.created_at,
            created_by: share.created_by.clone(),
            has_password: share.has_password(),
        }
    }
}

/// The view a share visitor gets of the shared item.
#[derive(Debug, Clone, Serialize)]
pub struct SharedItemResponse {
    /// `"file"` or `"folder"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Root-relative path of the item being viewed.
    pub path: String,
    /// File size; file shares only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Directory contents; folder views only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<FolderEntry>>,
    /// Whether this share requires a password.
    pub password_required: bool,
}

impl SharedItemResponse {
    /// View of a shared folder (or a sub-folder while browsing).
    pub fn folder(share: &ShareLink, path: String, entries: Vec<FolderEntry>) -> Self {
        Self {
            kind: "folder".to_string(),
            path,
            size: None,
            entries: Some(entries),
            password_required: share.has_password(),
        }
    }

    /// View of a shared single file.
    pub fn file(share: &ShareLink, path: String, size: u64) -> Self {
        Self {
            kind: "file".to_string(),
            path,
            size: Some(size),
            entries: None,
            password_required: share.has_password(),
        }
    }
}

/// User account summary (admin listing and mutations).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

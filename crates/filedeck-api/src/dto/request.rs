//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

/// Runs declarative validation and maps failures to a 400.
pub fn validated<T: Validate>(value: T) -> AppResult<T> {
    value
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(value)
}

/// Login form body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Directory listing query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FolderQuery {
    /// Path under the scan root; absent or empty means the root itself.
    pub path: Option<String>,
    /// Index of the first entry to return.
    pub offset: Option<usize>,
    /// Page size, capped at one page of 200 entries.
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: Option<usize>,
}

/// Scan trigger query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanQuery {
    /// Subtree to scan; absent or empty means the whole root.
    pub path: Option<String>,
}

/// Search query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchQuery {
    /// Substring to match against indexed names, case-insensitive.
    #[validate(length(min = 2, message = "Search query must be at least 2 characters"))]
    pub q: String,
    /// Maximum number of hits.
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    pub limit: Option<usize>,
    /// Restrict hits to this subtree.
    pub path: Option<String>,
}

/// Share creation query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareParams {
    /// Path under the scan root to share.
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    /// Optional password protecting the share. Empty means none.
    pub password: Option<String>,
    /// Share lifetime in seconds.
    pub expires_in: i64,
}

/// Password form for public share resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePasswordForm {
    /// Share password when the link is protected.
    pub password: Option<String>,
}

/// Form for browsing inside a folder share.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShareBrowseForm {
    /// Share password when the link is protected.
    pub password: Option<String>,
    /// Path of the sub-folder, relative to the shared folder.
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
}

/// Query for single-file download through a share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareDownloadParams {
    /// File to download, relative to the shared folder. Not needed for
    /// file shares.
    pub file: Option<String>,
    /// Share password when the link is protected.
    pub password: Option<String>,
}

/// Query for zip download through a share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderDownloadParams {
    /// Sub-folder to archive, relative to the shared folder. Absent
    /// means the share target itself.
    pub path: Option<String>,
    /// Share password when the link is protected.
    pub password: Option<String>,
}

/// Delete target query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteParams {
    /// Path under the scan root to delete.
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
}

/// Rename parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameParams {
    /// Current path under the scan root.
    #[validate(length(min = 1, message = "old_path is required"))]
    pub old_path: String,
    /// New name within the same parent directory.
    #[validate(length(min = 1, max = 255, message = "new_name must be 1-255 characters"))]
    pub new_name: String,
}

/// Create user form body (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserForm {
    /// Username.
    #[validate(length(min = 1, max = 100, message = "username must be 1-100 characters"))]
    pub username: String,
    /// Password; the minimum length comes from configuration.
    pub password: String,
    /// Role name: admin, power, standard, or readonly.
    pub role: String,
}

/// Update user form body (admin). At least one field must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserForm {
    /// New role, if changing.
    pub role: Option<String>,
    /// New password, if changing.
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedeck_core::error::ErrorKind;

    fn search(q: &str, limit: Option<usize>) -> SearchQuery {
        SearchQuery {
            q: q.to_string(),
            limit,
            path: None,
        }
    }

    #[test]
    fn short_search_queries_are_rejected() {
        for q in ["", "a"] {
            let err = validated(search(q, None)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "query {q:?}");
        }
        assert!(validated(search("ab", None)).is_ok());
    }

    #[test]
    fn search_limit_bounds_are_enforced() {
        assert!(validated(search("ab", Some(0))).is_err());
        assert!(validated(search("ab", Some(500))).is_ok());
        assert!(validated(search("ab", Some(501))).is_err());
    }

    #[test]
    fn folder_limit_bounds_are_enforced() {
        let query = |limit| FolderQuery {
            path: None,
            offset: None,
            limit,
        };
        assert!(validated(query(Some(0))).is_err());
        assert!(validated(query(Some(200))).is_ok());
        assert!(validated(query(Some(201))).is_err());
        assert!(validated(query(None)).is_ok());
    }
}

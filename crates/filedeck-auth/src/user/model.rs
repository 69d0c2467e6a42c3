//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash. Never serialized into API responses; the
    /// store persists it through its own record type.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: String,
    /// User role (RBAC).
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}

/// Fields that may be changed on an existing user.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New role, if changing.
    pub role: Option<UserRole>,
    /// New pre-hashed password, if changing.
    pub password_hash: Option<String>,
}

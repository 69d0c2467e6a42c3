//! Role-based capability checks.
//!
//! Capabilities are pure functions of the role carried in the token;
//! no per-request store lookup is involved.

use filedeck_core::error::AppError;

use crate::user::role::UserRole;

/// Named operation classes gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// List directories and poll scan status.
    Browse,
    /// Download files and folder archives.
    Download,
    /// Create share links.
    Share,
    /// Delete files and folders.
    Delete,
    /// Rename files and folders.
    Rename,
    /// Create, update, and delete user accounts.
    ManageUsers,
}

/// Returns whether the role grants the capability.
///
/// Hierarchy: readonly < standard (adds share) < power (adds delete,
/// rename) < admin (adds user management).
pub fn allows(role: UserRole, capability: Capability) -> bool {
    match capability {
        Capability::Browse | Capability::Download => true,
        Capability::Share => role.has_at_least(UserRole::Standard),
        Capability::Delete | Capability::Rename => role.has_at_least(UserRole::Power),
        Capability::ManageUsers => role.is_admin(),
    }
}

/// Checks that the role grants the capability.
///
/// Returns `Ok(())` if allowed, or `Err(AppError::Forbidden)` if denied.
pub fn require(role: UserRole, capability: Capability) -> Result<(), AppError> {
    if allows(role, capability) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Role '{role}' does not have permission '{capability:?}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everyone_can_browse_and_download() {
        for role in [
            UserRole::ReadOnly,
            UserRole::Standard,
            UserRole::Power,
            UserRole::Admin,
        ] {
            assert!(allows(role, Capability::Browse));
            assert!(allows(role, Capability::Download));
        }
    }

    #[test]
    fn readonly_cannot_share_delete_or_rename() {
        assert!(!allows(UserRole::ReadOnly, Capability::Share));
        assert!(!allows(UserRole::ReadOnly, Capability::Delete));
        assert!(!allows(UserRole::ReadOnly, Capability::Rename));
        assert!(require(UserRole::ReadOnly, Capability::Share).is_err());
    }

    #[test]
    fn standard_shares_but_does_not_mutate() {
        assert!(allows(UserRole::Standard, Capability::Share));
        assert!(!allows(UserRole::Standard, Capability::Delete));
        assert!(!allows(UserRole::Standard, Capability::Rename));
    }

    #[test]
    fn power_mutates_but_does_not_manage_users() {
        assert!(allows(UserRole::Power, Capability::Delete));
        assert!(allows(UserRole::Power, Capability::Rename));
        assert!(!allows(UserRole::Power, Capability::ManageUsers));
    }

    #[test]
    fn only_admin_manages_users() {
        assert!(allows(UserRole::Admin, Capability::ManageUsers));
        for role in [UserRole::ReadOnly, UserRole::Standard, UserRole::Power] {
            assert!(!allows(role, Capability::ManageUsers));
        }
    }
}

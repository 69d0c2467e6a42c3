//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the RBAC system.
///
/// Roles are ordered by privilege level: Admin > Power > Standard > ReadOnly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrator: everything, including user management.
    Admin,
    /// Can delete and rename items in addition to sharing.
    Power,
    /// Can browse, download, and create share links.
    Standard,
    /// Browse and download only.
    ReadOnly,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(self) -> u8 {
        match self {
            Self::Admin => 4,
            Self::Power => 3,
            Self::Standard => 2,
            Self::ReadOnly => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(self, other: UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Power => "power",
            Self::Standard => "standard",
            Self::ReadOnly => "readonly",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = filedeck_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "power" => Ok(Self::Power),
            "standard" => Ok(Self::Standard),
            "readonly" => Ok(Self::ReadOnly),
            _ => Err(filedeck_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, power, standard, readonly"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(UserRole::Admin.has_at_least(UserRole::ReadOnly));
        assert!(UserRole::Admin.has_at_least(UserRole::Admin));
        assert!(UserRole::Power.has_at_least(UserRole::Standard));
        assert!(!UserRole::ReadOnly.has_at_least(UserRole::Standard));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("READONLY".parse::<UserRole>().unwrap(), UserRole::ReadOnly);
        assert!("invalid".parse::<UserRole>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::ReadOnly).unwrap(),
            "\"readonly\""
        );
        let role: UserRole = serde_json::from_str("\"power\"").unwrap();
        assert_eq!(role, UserRole::Power);
    }
}

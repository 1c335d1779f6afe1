//! Authentication and role definitions.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - The role set and which roles an administrator may hand out

mod password;

pub use password::{
    MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, PasswordError, check_password_policy, hash_password,
    verify_password,
};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Roles a user can hold. A user may hold several at once,
/// e.g. a President is always an Owner too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Manages every building and every account.
    SuperAdmin,
    /// Manages a single assigned building.
    President,
    /// Owns flats, is billed for common expenses, manages tenants.
    Owner,
    /// Lives in a flat.
    Tenant,
    /// Self-registered account waiting for owner approval.
    User,
}

/// Unknown role name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 5] = [
        Self::SuperAdmin,
        Self::President,
        Self::Owner,
        Self::Tenant,
        Self::User,
    ];

    /// Stable name used in storage and in API payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::President => "President",
            Self::Owner => "Owner",
            Self::Tenant => "Tenant",
            Self::User => "User",
        }
    }

    /// Returns true if a super admin may create accounts with this role.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        !matches!(self, Self::SuperAdmin)
    }

    /// Roles granted to an account created with `self` as its primary role.
    ///
    /// Presidents are billed like any other owner, so they get both.
    #[must_use]
    pub fn granted_with(self) -> Vec<Self> {
        match self {
            Self::President => vec![Self::President, Self::Owner],
            other => vec![other],
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("Janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_president_also_gets_owner() {
        assert_eq!(
            Role::President.granted_with(),
            vec![Role::President, Role::Owner]
        );
        assert_eq!(Role::Tenant.granted_with(), vec![Role::Tenant]);
    }

    #[test]
    fn test_super_admin_not_assignable() {
        assert!(!Role::SuperAdmin.is_assignable());
        assert!(Role::President.is_assignable());
        assert!(Role::User.is_assignable());
    }
}

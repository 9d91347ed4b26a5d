//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions and account input rules

mod password;
mod user;

pub use password::{PasswordError, hash_password, verify_password};
pub use user::{UserError, UserInput, ValidUser};

use serde::{Deserialize, Serialize};

/// Application roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access across all divisions.
    Admin,
    /// Access restricted to the user's own division.
    User,
}

impl UserRole {
    /// Parses a role string exactly as stored in tokens and the database.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Returns true if this role can manage user accounts.
    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role only sees rows of its own division.
    #[must_use]
    pub const fn is_division_scoped(self) -> bool {
        matches!(self, Self::User)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

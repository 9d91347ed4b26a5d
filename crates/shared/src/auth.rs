//! Token claims and login payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: i64,
    /// User role, `admin` or `user`.
    pub role: String,
    /// Division the user belongs to.
    pub division: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: i64, role: &str, division: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            division: division.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.sub
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Signed access token.
    pub token: String,
    /// User role.
    pub role: String,
    /// Canonical division name.
    pub division: String,
    /// Username.
    pub username: String,
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod claims_tests;

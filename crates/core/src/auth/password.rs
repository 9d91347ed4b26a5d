//! Password hashing.
//!
//! Stored hashes are Argon2id PHC strings; the salt and parameters travel
//! inside the string, so verification needs nothing but the hash.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{self, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use salesdesk_shared::AppError;
use thiserror::Error;

/// Password hashing failures. A wrong password is not an error.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Verification failed for a reason other than a mismatch.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Stored value is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks `password` against a stored hash; `Ok(false)` means mismatch.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` for a malformed stored hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

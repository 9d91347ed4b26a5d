//! User account input rules.

use salesdesk_shared::AppError;
use serde::Deserialize;
use thiserror::Error;

use super::UserRole;
use crate::division::normalize_division;

/// User input errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// Role is neither `admin` nor `user`.
    #[error("invalid role")]
    InvalidRole,
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Create/update request for a user account.
///
/// On update an absent or empty password keeps the stored hash.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: Option<String>,
    /// `admin` or `user`.
    pub role: String,
    /// Division, canonicalized on validation.
    pub division: String,
}

/// A validated user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    /// Trimmed login name.
    pub username: String,
    /// Password to hash, if one should be set.
    pub password: Option<String>,
    /// Parsed role.
    pub role: UserRole,
    /// Canonical division.
    pub division: String,
}

impl UserInput {
    /// Validates a new account; the password is mandatory.
    ///
    /// # Errors
    ///
    /// Returns `UserError` for blank fields or an unknown role.
    pub fn validate_new(self) -> Result<ValidUser, UserError> {
        if self.password.as_deref().is_none_or(|p| p.trim().is_empty()) {
            return Err(UserError::Required("password"));
        }
        self.validate()
    }

    /// Validates an account update.
    ///
    /// # Errors
    ///
    /// Returns `UserError` for blank fields or an unknown role.
    pub fn validate(self) -> Result<ValidUser, UserError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(UserError::Required("username"));
        }
        let role = UserRole::parse(self.role.trim()).ok_or(UserError::InvalidRole)?;
        let division = normalize_division(&self.division);
        if division.is_empty() {
            return Err(UserError::Required("division"));
        }

        Ok(ValidUser {
            username: username.to_string(),
            password: self.password.filter(|p| !p.is_empty()),
            role,
            division,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input() -> UserInput {
        UserInput {
            username: " sales01 ".into(),
            password: Some("secret".into()),
            role: "user".into(),
            division: "netco".into(),
        }
    }

    #[test]
    fn test_validate_new() {
        let user = input().validate_new().unwrap();

        assert_eq!(user.username, "sales01");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.division, "NetCo");
        assert_eq!(user.password.as_deref(), Some("secret"));
    }

    #[rstest]
    #[case(UserInput { username: " ".into(), ..input() }, UserError::Required("username"))]
    #[case(UserInput { password: None, ..input() }, UserError::Required("password"))]
    #[case(UserInput { password: Some(String::new()), ..input() }, UserError::Required("password"))]
    #[case(UserInput { role: "root".into(), ..input() }, UserError::InvalidRole)]
    #[case(UserInput { division: "".into(), ..input() }, UserError::Required("division"))]
    fn test_validate_new_rejects(#[case] input: UserInput, #[case] expected: UserError) {
        assert_eq!(input.validate_new(), Err(expected));
    }

    #[test]
    fn test_update_without_password_keeps_hash() {
        let user = UserInput {
            password: Some(String::new()),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(user.password, None);
    }
}

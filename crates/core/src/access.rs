//! Division-based access scoping.
//!
//! Admins see every division. Callers with the `user` role are pinned to the
//! division carried in their token: reads are filtered to it, writes are
//! forced into it, and touching another division's row is forbidden.

use salesdesk_shared::{AppError, Claims};
use thiserror::Error;

use crate::auth::UserRole;
use crate::division::{Division, is_all, normalize_division};

/// Access-control failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Token role is not recognized.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// A division-scoped caller has no division in their token.
    #[error("missing division in token")]
    MissingDivision,

    /// Row belongs to a different division.
    #[error("forbidden: different division")]
    DivisionMismatch,

    /// Operation requires the admin role.
    #[error("admin only")]
    AdminOnly,

    /// Division is not one of the canonical divisions.
    #[error("invalid division")]
    InvalidDivision,
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidDivision => Self::Validation(err.to_string()),
            AccessError::UnknownRole(_)
            | AccessError::MissingDivision
            | AccessError::DivisionMismatch
            | AccessError::AdminOnly => Self::Forbidden(err.to_string()),
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// User ID.
    pub user_id: i64,
    /// Role from the token.
    pub role: UserRole,
    /// Canonicalized division from the token (may be empty for admins).
    pub division: String,
}

impl Caller {
    /// Creates a caller, canonicalizing the division.
    #[must_use]
    pub fn new(user_id: i64, role: UserRole, division: &str) -> Self {
        Self {
            user_id,
            role,
            division: normalize_division(division),
        }
    }

    /// Builds a caller from validated token claims.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::UnknownRole` when the role claim is not recognized.
    pub fn from_claims(claims: &Claims) -> Result<Self, AccessError> {
        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| AccessError::UnknownRole(claims.role.clone()))?;
        Ok(Self::new(claims.user_id(), role, &claims.division))
    }

    /// Returns true for admin callers.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Fails unless the caller is an admin.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AdminOnly` for non-admin callers.
    pub const fn require_admin(&self) -> Result<(), AccessError> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(AccessError::AdminOnly)
        }
    }

    /// Resolves the division a read query should be restricted to.
    ///
    /// Division-scoped callers always get their own division. Admins get the
    /// canonicalized requested division, or `None` when it is empty or `ALL`.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingDivision` for a scoped caller without a division.
    pub fn scoped_division(&self, requested: Option<&str>) -> Result<Option<String>, AccessError> {
        if self.role.is_division_scoped() {
            return self.own_division().map(|d| Some(d.to_string()));
        }

        Ok(requested
            .map(normalize_division)
            .filter(|d| !d.is_empty() && !is_all(d)))
    }

    /// Resolves the division a new or updated row is written to.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingDivision` for a scoped caller without a
    /// division, or `AccessError::InvalidDivision` when the result is not canonical.
    pub fn assign_division(&self, requested: &str) -> Result<Division, AccessError> {
        let candidate = if self.role.is_division_scoped() {
            self.own_division()?
        } else {
            requested
        };
        Division::parse(candidate).ok_or(AccessError::InvalidDivision)
    }

    /// Checks that the caller may touch a row owned by `row_division`.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::DivisionMismatch` when a scoped caller targets
    /// another division's row.
    pub fn ensure_can_access(&self, row_division: &str) -> Result<(), AccessError> {
        if !self.role.is_division_scoped() {
            return Ok(());
        }
        let own = self.own_division()?;
        if normalize_division(row_division) == own {
            Ok(())
        } else {
            Err(AccessError::DivisionMismatch)
        }
    }

    fn own_division(&self) -> Result<&str, AccessError> {
        if self.division.is_empty() {
            Err(AccessError::MissingDivision)
        } else {
            Ok(&self.division)
        }
    }
}

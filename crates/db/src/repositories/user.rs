//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use salesdesk_core::auth::ValidUser;
use salesdesk_shared::AppError;

use crate::entities::users;
use crate::error::is_unique_violation;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("user not found: {0}")]
    NotFound(i64),

    /// Username already taken.
    #[error("username already exists")]
    DuplicateUsername,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::DuplicateUsername => Self::Conflict(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Maps a unique violation on `users.username` to `DuplicateUsername`.
fn classify(err: DbErr) -> UserError {
    if is_unique_violation(&err) {
        UserError::DuplicateUsername
    } else {
        UserError::Database(err)
    }
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists every user ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
    }

    /// Creates a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `UserError::DuplicateUsername` if the username is taken.
    pub async fn create(
        &self,
        user: &ValidUser,
        password_hash: &str,
    ) -> Result<users::Model, UserError> {
        let now = chrono::Utc::now().into();
        let model = users::ActiveModel {
            username: Set(user.username.clone()),
            password_hash: Set(password_hash.to_string()),
            role: Set(user.role.as_str().to_string()),
            division: Set(user.division.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(classify)
    }

    /// Updates a user; the password hash changes only when one is given.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` for an unknown ID or
    /// `UserError::DuplicateUsername` if the new username is taken.
    pub async fn update(
        &self,
        id: i64,
        user: &ValidUser,
        password_hash: Option<&str>,
    ) -> Result<users::Model, UserError> {
        let existing = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;

        let mut model: users::ActiveModel = existing.into();
        model.username = Set(user.username.clone());
        model.role = Set(user.role.as_str().to_string());
        model.division = Set(user.division.clone());
        if let Some(hash) = password_hash {
            model.password_hash = Set(hash.to_string());
        }
        model.updated_at = Set(chrono::Utc::now().into());

        model.update(&self.db).await.map_err(classify)
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` when no row was deleted.
    pub async fn delete(&self, id: i64) -> Result<(), UserError> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }
}

//! Customer repository.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
};

use salesdesk_core::customer::{CustomerPatch, NewCustomer};
use salesdesk_shared::AppError;

use crate::entities::customers;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("customer not found: {0}")]
    NotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::NotFound(_) => Self::NotFound(err.to_string()),
            CustomerError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists customers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<customers::Model>, DbErr> {
        customers::Entity::find()
            .order_by_asc(customers::Column::Name)
            .order_by_asc(customers::Column::Id)
            .all(&self.db)
            .await
    }

    /// Finds a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` for an unknown ID.
    pub async fn find(&self, id: i64) -> Result<customers::Model, CustomerError> {
        customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(&self, input: NewCustomer) -> Result<customers::Model, DbErr> {
        let now = chrono::Utc::now().into();
        customers::ActiveModel {
            name: Set(input.name),
            industry: Set(input.industry),
            region: Set(input.region),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Applies a partial update; only supplied fields change.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` for an unknown ID.
    pub async fn update(
        &self,
        id: i64,
        patch: CustomerPatch,
    ) -> Result<customers::Model, CustomerError> {
        let mut model: customers::ActiveModel = self.find(id).await?.into();
        if let Some(name) = patch.name {
            model.name = Set(name);
        }
        if let Some(industry) = patch.industry {
            model.industry = Set(Some(industry));
        }
        if let Some(region) = patch.region {
            model.region = Set(Some(region));
        }
        model.updated_at = Set(chrono::Utc::now().into());

        Ok(model.update(&self.db).await?)
    }

    /// Deletes a customer; its projects keep running without one.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` when no row was deleted.
    pub async fn delete(&self, id: i64) -> Result<(), CustomerError> {
        let result = customers::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(CustomerError::NotFound(id));
        }
        Ok(())
    }
}

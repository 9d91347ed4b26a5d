//! Budget repository for division budgets and their realization rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

use salesdesk_core::budget::{
    BudgetError, BudgetService, BudgetSummary, CreateRealizationInput, UpdateRealizationInput,
    ValidBudget,
};
use salesdesk_core::month::YearMonth;
use salesdesk_shared::AppError;

use crate::entities::{budget_realization, budgets};
use crate::error::is_unique_violation;
use crate::filter::SqlConditions;

const BUDGET_WITH_REALIZATION: &str = r"
SELECT b.id, b.division, b.month, b.budget_amount,
       COALESCE(SUM(br.amount), 0) AS total_realization,
       b.created_at, b.updated_at
FROM budgets b
LEFT JOIN budget_realization br ON br.budget_id = b.id
";

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetRepoError {
    /// Budget not found.
    #[error("budget not found: {0}")]
    NotFound(i64),

    /// Realization row not found under the given budget.
    #[error("realization not found: {0}")]
    RealizationNotFound(i64),

    /// A budget already exists for the division and month.
    #[error("budget for this month and division already exists")]
    Duplicate,

    /// Business rule violated.
    #[error(transparent)]
    Rule(#[from] BudgetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BudgetRepoError> for AppError {
    fn from(err: BudgetRepoError) -> Self {
        match err {
            BudgetRepoError::NotFound(_) | BudgetRepoError::RealizationNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            BudgetRepoError::Duplicate => Self::Conflict(err.to_string()),
            BudgetRepoError::Rule(e) => e.into(),
            BudgetRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct BudgetRow {
    id: i64,
    division: String,
    month: NaiveDate,
    budget_amount: Decimal,
    total_realization: Decimal,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
}

/// A budget with its realization rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetView {
    pub id: i64,
    pub division: String,
    pub month: YearMonth,
    #[serde(flatten)]
    pub summary: BudgetSummary,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<BudgetRow> for BudgetView {
    fn from(row: BudgetRow) -> Self {
        Self {
            id: row.id,
            division: row.division,
            month: YearMonth::from_date(row.month),
            summary: BudgetService::summarize(row.budget_amount, row.total_realization),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A budget with every realization row, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetDetail {
    pub budget: BudgetView,
    pub realization: Vec<budget_realization::Model>,
}

/// Budget and realization for one month of a division's year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct TrendPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub budget: Decimal,
    pub realization: Decimal,
}

fn list_sql(conds: &SqlConditions) -> String {
    format!(
        "{BUDGET_WITH_REALIZATION} WHERE {} GROUP BY b.id ORDER BY b.month, b.division",
        conds.clause()
    )
}

fn list_conditions(division: Option<&str>, year: Option<i32>) -> SqlConditions {
    let mut conds = SqlConditions::new();
    if let Some(division) = division {
        conds.push_eq("b.division", division.to_owned());
    }
    if let Some(year) = year {
        conds.push_cmp("EXTRACT(YEAR FROM b.month)::int", "=", year);
    }
    conds
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::Duplicate` when the division already has a
    /// budget for the month.
    pub async fn create(&self, budget: &ValidBudget) -> Result<budgets::Model, BudgetRepoError> {
        let now = chrono::Utc::now().into();
        let model = budgets::ActiveModel {
            division: Set(budget.division.as_str().to_owned()),
            month: Set(budget.month.first_day()),
            budget_amount: Set(budget.budget_amount),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BudgetRepoError::Duplicate
            } else {
                BudgetRepoError::Database(e)
            }
        })?;

        tracing::info!(
            budget_id = %model.id,
            division = %model.division,
            month = %budget.month,
            "Budget created"
        );
        Ok(model)
    }

    /// Lists budgets with realization totals, ordered by month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        division: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<BudgetView>, DbErr> {
        let conds = list_conditions(division, year);
        let rows = BudgetRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            list_sql(&conds),
            conds.values(),
        ))
        .all(&self.db)
        .await?;
        Ok(rows.into_iter().map(BudgetView::from).collect())
    }

    /// Finds a budget with its realization rollup.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::NotFound` for an unknown ID.
    pub async fn find(&self, id: i64) -> Result<BudgetView, BudgetRepoError> {
        find_view(&self.db, id).await
    }

    /// Loads a budget and its realization rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::NotFound` for an unknown ID.
    pub async fn detail(&self, id: i64) -> Result<BudgetDetail, BudgetRepoError> {
        let budget = self.find(id).await?;
        let realization = budget_realization::Entity::find()
            .filter(budget_realization::Column::BudgetId.eq(id))
            .order_by_desc(budget_realization::Column::CreatedAt)
            .order_by_desc(budget_realization::Column::Id)
            .all(&self.db)
            .await?;
        Ok(BudgetDetail {
            budget,
            realization,
        })
    }

    /// Changes a budget amount.
    ///
    /// The budget row is locked while the booked realization is summed, so a
    /// concurrent realization insert cannot slip under the new amount.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::Rule` when the amount is negative or below
    /// the booked realization, or `NotFound` for an unknown ID.
    pub async fn update_amount(
        &self,
        id: i64,
        amount: Decimal,
    ) -> Result<BudgetView, BudgetRepoError> {
        BudgetService::validate_amount(amount)?;

        let txn = self.db.begin().await?;

        let budget = budgets::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(BudgetRepoError::NotFound(id))?;

        let total = total_realization(&txn, id).await?;
        BudgetService::ensure_amount_covers_realization(amount, total)?;

        let mut model: budgets::ActiveModel = budget.into();
        model.budget_amount = Set(amount);
        model.updated_at = Set(chrono::Utc::now().into());
        model.update(&txn).await?;

        let view = find_view(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(budget_id = %id, amount = %amount, "Budget amount updated");
        Ok(view)
    }

    /// Books a realization row against a budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::Rule` for an invalid input, or `NotFound`
    /// for an unknown budget.
    pub async fn add_realization(
        &self,
        budget_id: i64,
        input: &CreateRealizationInput,
    ) -> Result<budget_realization::Model, BudgetRepoError> {
        BudgetService::validate_realization(input)?;

        budgets::Entity::find_by_id(budget_id)
            .one(&self.db)
            .await?
            .ok_or(BudgetRepoError::NotFound(budget_id))?;

        let now = chrono::Utc::now().into();
        let model = budget_realization::ActiveModel {
            budget_id: Set(budget_id),
            category: Set(input.category.trim().to_owned()),
            amount: Set(input.amount),
            note: Set(input.note.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            budget_id = %budget_id,
            realization_id = %model.id,
            amount = %model.amount,
            "Budget realization added"
        );
        Ok(model)
    }

    /// Updates a realization row; absent fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::RealizationNotFound` when the row does not
    /// belong to the budget.
    pub async fn update_realization(
        &self,
        budget_id: i64,
        realization_id: i64,
        input: &UpdateRealizationInput,
    ) -> Result<budget_realization::Model, BudgetRepoError> {
        BudgetService::validate_realization_update(input)?;

        let existing = find_realization(&self.db, budget_id, realization_id).await?;
        let mut model: budget_realization::ActiveModel = existing.into();
        if let Some(category) = &input.category {
            model.category = Set(category.trim().to_owned());
        }
        if let Some(amount) = input.amount {
            model.amount = Set(amount);
        }
        if let Some(note) = &input.note {
            model.note = Set(Some(note.clone()));
        }
        model.updated_at = Set(chrono::Utc::now().into());

        Ok(model.update(&self.db).await?)
    }

    /// Deletes a realization row.
    ///
    /// # Errors
    ///
    /// Returns `BudgetRepoError::RealizationNotFound` when no row was deleted.
    pub async fn delete_realization(
        &self,
        budget_id: i64,
        realization_id: i64,
    ) -> Result<(), BudgetRepoError> {
        let result = budget_realization::Entity::delete_many()
            .filter(budget_realization::Column::Id.eq(realization_id))
            .filter(budget_realization::Column::BudgetId.eq(budget_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(BudgetRepoError::RealizationNotFound(realization_id));
        }
        Ok(())
    }

    /// Monthly budget and realization for one division's year.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trend(&self, division: &str, year: i32) -> Result<Vec<TrendPoint>, DbErr> {
        let range = salesdesk_core::month::FiscalRange::year(year);
        TrendPoint::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
            SELECT to_char(b.month, 'YYYY-MM') AS month,
                   b.budget_amount AS budget,
                   COALESCE(SUM(br.amount), 0) AS realization
            FROM budgets b
            LEFT JOIN budget_realization br ON br.budget_id = b.id
            WHERE b.division = $1 AND b.month BETWEEN $2 AND $3
            GROUP BY b.id, b.month, b.budget_amount
            ORDER BY b.month ASC
            ",
            [division.into(), range.from.into(), range.to.into()],
        ))
        .all(&self.db)
        .await
    }
}

async fn find_view<C: ConnectionTrait>(db: &C, id: i64) -> Result<BudgetView, BudgetRepoError> {
    let row = BudgetRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        format!("{BUDGET_WITH_REALIZATION} WHERE b.id = $1 GROUP BY b.id"),
        [id.into()],
    ))
    .one(db)
    .await?
    .ok_or(BudgetRepoError::NotFound(id))?;
    Ok(row.into())
}

async fn find_realization<C: ConnectionTrait>(
    db: &C,
    budget_id: i64,
    realization_id: i64,
) -> Result<budget_realization::Model, BudgetRepoError> {
    budget_realization::Entity::find_by_id(realization_id)
        .filter(budget_realization::Column::BudgetId.eq(budget_id))
        .one(db)
        .await?
        .ok_or(BudgetRepoError::RealizationNotFound(realization_id))
}

#[derive(Debug, FromQueryResult)]
struct TotalRow {
    total: Decimal,
}

async fn total_realization<C: ConnectionTrait>(db: &C, budget_id: i64) -> Result<Decimal, DbErr> {
    Ok(TotalRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT COALESCE(SUM(amount), 0) AS total FROM budget_realization WHERE budget_id = $1",
        [budget_id.into()],
    ))
    .one(db)
    .await?
    .map_or(Decimal::ZERO, |row| row.total))
}

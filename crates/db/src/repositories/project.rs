//! Project repository: projects, their revenue plans and code sequences.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};
use serde::Serialize;

use salesdesk_core::month::YearMonth;
use salesdesk_core::project::{
    PostPoStatus, ProjectSort, SortDirection, SortField, ValidatedProject, format_project_code,
    is_completed,
};
use salesdesk_core::revenue::RealizationPlan;
use salesdesk_shared::AppError;

use crate::entities::{project_revenue_plan, projects};
use crate::error::is_unique_violation;
use crate::filter::SqlConditions;

const NEXT_CODE_SEQUENCE: &str = r"
INSERT INTO project_code_sequences (year, division_code, last_seq)
VALUES ($1, $2, 1)
ON CONFLICT (year, division_code)
DO UPDATE SET last_seq = project_code_sequences.last_seq + 1
RETURNING last_seq
";

const PROJECT_COLUMNS: &str = r"
    p.id, p.project_code, p.description, p.customer_id,
    COALESCE(cu.name, '') AS customer_name,
    p.division, p.status, p.project_type, p.sales_stage,
    p.sph_status, p.sph_release_date, p.sph_release_status, p.sph_number,
    p.sph_status_reason_category, p.sph_status_reason_note,
    p.created_at, p.updated_at
";

/// Error types for project persistence.
#[derive(Debug, thiserror::Error)]
pub enum ProjectRepoError {
    /// Project not found.
    #[error("project not found: {0}")]
    NotFound(i64),

    /// Generated project code collided with an existing one.
    #[error("project code already exists")]
    DuplicateCode,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProjectRepoError> for AppError {
    fn from(err: ProjectRepoError) -> Self {
        match err {
            ProjectRepoError::NotFound(_) => Self::NotFound(err.to_string()),
            ProjectRepoError::DuplicateCode => Self::Conflict(err.to_string()),
            ProjectRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Identity returned after a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedProject {
    /// New project ID.
    pub id: i64,
    /// Allocated code, e.g. `PRJ-OGM-2025-0001`.
    pub project_code: String,
    /// Owning division.
    pub division: String,
}

/// Division and stage of a project, used for access checks.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ProjectScope {
    /// Owning division.
    pub division: String,
    /// Current sales stage.
    pub sales_stage: i16,
}

/// A project joined with its customer's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ProjectRow {
    pub id: i64,
    pub project_code: String,
    pub description: String,
    pub customer_id: Option<i64>,
    /// Empty when the project has no customer.
    pub customer_name: String,
    pub division: String,
    pub status: String,
    pub project_type: String,
    pub sales_stage: i16,
    pub sph_status: Option<String>,
    pub sph_release_date: Option<NaiveDate>,
    pub sph_release_status: String,
    pub sph_number: Option<String>,
    pub sph_status_reason_category: Option<String>,
    pub sph_status_reason_note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, FromQueryResult)]
struct ProjectListRow {
    id: i64,
    project_code: String,
    description: String,
    customer_id: Option<i64>,
    customer_name: String,
    division: String,
    status: String,
    project_type: String,
    sales_stage: i16,
    sph_status: Option<String>,
    sph_release_date: Option<NaiveDate>,
    sph_release_status: String,
    sph_number: Option<String>,
    sph_status_reason_category: Option<String>,
    sph_status_reason_note: Option<String>,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    total_revenue: Decimal,
    total_realization: Decimal,
    start_month: Option<String>,
    end_month: Option<String>,
    stage1_status: Option<String>,
    stage2_status: Option<String>,
    stage3_status: Option<String>,
    stage4_status: Option<String>,
    stage5_status: Option<String>,
}

/// Post-PO statuses shown in project listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPoStatuses {
    pub stage1_status: PostPoStatus,
    pub stage2_status: PostPoStatus,
    pub stage3_status: PostPoStatus,
    pub stage4_status: PostPoStatus,
    pub stage5_status: PostPoStatus,
    /// All five stages are done.
    pub completed: bool,
}

impl PostPoStatuses {
    fn from_columns(columns: [Option<String>; 5]) -> Option<Self> {
        if columns.iter().all(Option::is_none) {
            return None;
        }
        let [s1, s2, s3, s4, s5] = columns.map(|c| {
            c.as_deref()
                .and_then(PostPoStatus::parse)
                .unwrap_or_default()
        });
        Some(Self {
            stage1_status: s1,
            stage2_status: s2,
            stage3_status: s3,
            stage4_status: s4,
            stage5_status: s5,
            completed: is_completed(&[s1, s2, s3, s4, s5]),
        })
    }
}

/// One row of the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: ProjectRow,
    /// Sum of monthly targets.
    pub total_revenue: Decimal,
    /// Sum of monthly realization.
    pub total_realization: Decimal,
    /// First planned month, `YYYY-MM`.
    pub start_month: Option<String>,
    /// Last planned month, `YYYY-MM`.
    pub end_month: Option<String>,
    /// Present once monitoring has started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postpo_monitoring: Option<PostPoStatuses>,
}

impl From<ProjectListRow> for ProjectListItem {
    fn from(row: ProjectListRow) -> Self {
        let postpo_monitoring = PostPoStatuses::from_columns([
            row.stage1_status,
            row.stage2_status,
            row.stage3_status,
            row.stage4_status,
            row.stage5_status,
        ]);
        Self {
            project: ProjectRow {
                id: row.id,
                project_code: row.project_code,
                description: row.description,
                customer_id: row.customer_id,
                customer_name: row.customer_name,
                division: row.division,
                status: row.status,
                project_type: row.project_type,
                sales_stage: row.sales_stage,
                sph_status: row.sph_status,
                sph_release_date: row.sph_release_date,
                sph_release_status: row.sph_release_status,
                sph_number: row.sph_number,
                sph_status_reason_category: row.sph_status_reason_category,
                sph_status_reason_note: row.sph_status_reason_note,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            total_revenue: row.total_revenue,
            total_realization: row.total_realization,
            start_month: row.start_month,
            end_month: row.end_month,
            postpo_monitoring,
        }
    }
}

/// Project counts by lifecycle phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ProjectSummary {
    pub total_projects: i64,
    /// Stage below 6.
    pub prospect_projects: i64,
    /// Stage 6.
    pub closing_projects: i64,
    /// Stage 6 with post-PO work outstanding.
    pub in_execution_projects: i64,
    /// Stage 6 with every post-PO stage done.
    pub completed_projects: i64,
    /// Sum of all monthly targets in scope.
    pub total_target_revenue: Decimal,
}

/// One month of a project's revenue plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenuePlanItem {
    pub month: YearMonth,
    pub target_revenue: Decimal,
    pub target_realization: Decimal,
}

impl From<project_revenue_plan::Model> for RevenuePlanItem {
    fn from(model: project_revenue_plan::Model) -> Self {
        Self {
            month: YearMonth::from_date(model.month),
            target_revenue: model.target_revenue,
            target_realization: model.target_realization,
        }
    }
}

/// SQL expression for a whitelisted sort field.
pub(crate) const fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "p.id",
        SortField::Code => "p.project_code",
        SortField::Division => "p.division",
        SortField::Status => "p.status",
        SortField::Type => "p.project_type",
        SortField::Revenue => "total_revenue",
        SortField::Realization => "total_realization",
    }
}

pub(crate) fn order_by_clause(sort: ProjectSort) -> String {
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    match sort.field {
        SortField::Id => format!("p.id {direction}"),
        field => format!("{} {direction}, p.id DESC", sort_column(field)),
    }
}

fn scope_conditions(division: Option<&str>) -> SqlConditions {
    let mut conds = SqlConditions::new();
    if let Some(division) = division {
        conds.push_eq("p.division", division.to_owned());
    }
    conds
}

fn statement(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
}

/// Project repository.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a project with its revenue plan and allocates its code.
    ///
    /// The sequence row for `(year, division)` is incremented inside the
    /// same transaction, so concurrent creates serialize on it.
    ///
    /// # Errors
    ///
    /// Returns `ProjectRepoError::DuplicateCode` if the code is taken, or a
    /// database error.
    pub async fn create_with_plans(
        &self,
        project: &ValidatedProject,
        year: i32,
    ) -> Result<CreatedProject, ProjectRepoError> {
        let txn = self.db.begin().await?;

        let sequence = next_sequence(&txn, year, project.division.code()).await?;
        let project_code = format_project_code(project.division, year, sequence);

        let now = chrono::Utc::now().into();
        let mut model = active_model(project);
        model.project_code = Set(project_code.clone());
        model.created_at = Set(now);
        model.updated_at = Set(now);
        let inserted = model.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                ProjectRepoError::DuplicateCode
            } else {
                ProjectRepoError::Database(e)
            }
        })?;

        if !project.revenue_plans.is_empty() {
            let plans = project
                .revenue_plans
                .iter()
                .map(|plan| project_revenue_plan::ActiveModel {
                    project_id: Set(inserted.id),
                    month: Set(plan.month.first_day()),
                    target_revenue: Set(plan.target_revenue),
                    target_realization: Set(Decimal::ZERO),
                    ..Default::default()
                });
            project_revenue_plan::Entity::insert_many(plans)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        tracing::info!(
            project_id = %inserted.id,
            project_code = %project_code,
            "Project created"
        );

        Ok(CreatedProject {
            id: inserted.id,
            project_code,
            division: inserted.division,
        })
    }

    /// Updates a project and replaces its revenue plan.
    ///
    /// Months still in the plan keep their booked realization; months
    /// dropped from the plan are deleted.
    ///
    /// # Errors
    ///
    /// Returns `ProjectRepoError::NotFound` for an unknown ID.
    pub async fn update_with_plans(
        &self,
        id: i64,
        project: &ValidatedProject,
    ) -> Result<(), ProjectRepoError> {
        let txn = self.db.begin().await?;

        let existing = projects::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ProjectRepoError::NotFound(id))?;

        let mut model = active_model(project);
        model.id = Set(existing.id);
        model.project_code = Set(existing.project_code);
        model.created_at = Set(existing.created_at);
        model.updated_at = Set(chrono::Utc::now().into());
        model.update(&txn).await?;

        for plan in &project.revenue_plans {
            project_revenue_plan::Entity::insert(project_revenue_plan::ActiveModel {
                project_id: Set(id),
                month: Set(plan.month.first_day()),
                target_revenue: Set(plan.target_revenue),
                target_realization: Set(Decimal::ZERO),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([
                    project_revenue_plan::Column::ProjectId,
                    project_revenue_plan::Column::Month,
                ])
                .update_column(project_revenue_plan::Column::TargetRevenue)
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }

        let kept: Vec<NaiveDate> = project
            .revenue_plans
            .iter()
            .map(|plan| plan.month.first_day())
            .collect();
        let mut stale = project_revenue_plan::Entity::delete_many()
            .filter(project_revenue_plan::Column::ProjectId.eq(id));
        if !kept.is_empty() {
            stale = stale.filter(project_revenue_plan::Column::Month.is_not_in(kept));
        }
        stale.exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(project_id = %id, "Project updated");
        Ok(())
    }

    /// Deletes a project; plans and monitoring cascade.
    ///
    /// # Errors
    ///
    /// Returns `ProjectRepoError::NotFound` when no row was deleted.
    pub async fn delete(&self, id: i64) -> Result<(), ProjectRepoError> {
        let result = projects::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ProjectRepoError::NotFound(id));
        }
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    /// Loads the division and sales stage of a project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectRepoError::NotFound` for an unknown ID.
    pub async fn scope(&self, id: i64) -> Result<ProjectScope, ProjectRepoError> {
        ProjectScope::find_by_statement(statement(
            "SELECT division, sales_stage FROM projects WHERE id = $1",
            vec![id.into()],
        ))
        .one(&self.db)
        .await?
        .ok_or(ProjectRepoError::NotFound(id))
    }

    /// Finds a project with its customer name.
    ///
    /// # Errors
    ///
    /// Returns `ProjectRepoError::NotFound` for an unknown ID.
    pub async fn find(&self, id: i64) -> Result<ProjectRow, ProjectRepoError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p \
             LEFT JOIN customers cu ON cu.id = p.customer_id \
             WHERE p.id = $1"
        );
        ProjectRow::find_by_statement(statement(&sql, vec![id.into()]))
            .one(&self.db)
            .await?
            .ok_or(ProjectRepoError::NotFound(id))
    }

    /// Lists projects with plan totals and post-PO statuses.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        division: Option<&str>,
        sort: ProjectSort,
    ) -> Result<Vec<ProjectListItem>, DbErr> {
        let conds = scope_conditions(division);
        let sql = format!(
            "SELECT {PROJECT_COLUMNS},
                COALESCE(SUM(rp.target_revenue), 0) AS total_revenue,
                COALESCE(SUM(rp.target_realization), 0) AS total_realization,
                to_char(MIN(rp.month), 'YYYY-MM') AS start_month,
                to_char(MAX(rp.month), 'YYYY-MM') AS end_month,
                m.stage1_status, m.stage2_status, m.stage3_status,
                m.stage4_status, m.stage5_status
             FROM projects p
             LEFT JOIN customers cu ON cu.id = p.customer_id
             LEFT JOIN project_revenue_plan rp ON rp.project_id = p.id
             LEFT JOIN project_postpo_monitoring m ON m.project_id = p.id
             WHERE {where_clause}
             GROUP BY p.id, cu.name,
                m.stage1_status, m.stage2_status, m.stage3_status,
                m.stage4_status, m.stage5_status
             ORDER BY {order_by}",
            where_clause = conds.clause(),
            order_by = order_by_clause(sort),
        );

        let rows = ProjectListRow::find_by_statement(statement(&sql, conds.values()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ProjectListItem::from).collect())
    }

    /// Counts projects by phase and sums their targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary(&self, division: Option<&str>) -> Result<ProjectSummary, DbErr> {
        let conds = scope_conditions(division);
        let sql = format!(
            "SELECT
                COUNT(*) AS total_projects,
                COUNT(*) FILTER (WHERE p.sales_stage < 6) AS prospect_projects,
                COUNT(*) FILTER (WHERE p.sales_stage = 6) AS closing_projects,
                COUNT(*) FILTER (
                    WHERE p.sales_stage = 6 AND (m.project_id IS NULL OR NOT {done})
                ) AS in_execution_projects,
                COUNT(*) FILTER (
                    WHERE p.sales_stage = 6 AND m.project_id IS NOT NULL AND {done}
                ) AS completed_projects,
                COALESCE((
                    SELECT SUM(rp.target_revenue)
                    FROM project_revenue_plan rp
                    JOIN projects p ON p.id = rp.project_id
                    WHERE {where_clause}
                ), 0) AS total_target_revenue
             FROM projects p
             LEFT JOIN project_postpo_monitoring m ON m.project_id = p.id
             WHERE {where_clause}",
            done = crate::filter::ALL_POSTPO_DONE,
            where_clause = conds.clause(),
        );

        Ok(ProjectSummary::find_by_statement(statement(&sql, conds.values()))
            .one(&self.db)
            .await?
            .unwrap_or_default())
    }

    /// Loads a project's revenue plan ordered by month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revenue_plans(&self, project_id: i64) -> Result<Vec<RevenuePlanItem>, DbErr> {
        let rows = project_revenue_plan::Entity::find()
            .filter(project_revenue_plan::Column::ProjectId.eq(project_id))
            .order_by_asc(project_revenue_plan::Column::Month)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(RevenuePlanItem::from).collect())
    }

    /// Books realization on the target month, clearing the source month
    /// when the amount moves.
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction fails.
    pub async fn apply_realization(
        &self,
        project_id: i64,
        plan: &RealizationPlan,
    ) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        project_revenue_plan::Entity::insert(project_revenue_plan::ActiveModel {
            project_id: Set(project_id),
            month: Set(plan.target.first_day()),
            target_revenue: Set(Decimal::ZERO),
            target_realization: Set(Decimal::ZERO),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                project_revenue_plan::Column::ProjectId,
                project_revenue_plan::Column::Month,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        set_realization(&txn, project_id, plan.target.first_day(), plan.amount).await?;
        if plan.clear_source {
            set_realization(&txn, project_id, plan.source.first_day(), Decimal::ZERO).await?;
        }

        txn.commit().await?;

        tracing::info!(
            project_id = %project_id,
            source = %plan.source,
            target = %plan.target,
            "Realization applied"
        );
        Ok(())
    }
}

#[derive(Debug, FromQueryResult)]
struct SequenceRow {
    last_seq: i32,
}

async fn next_sequence(
    txn: &DatabaseTransaction,
    year: i32,
    division_code: &str,
) -> Result<i32, DbErr> {
    SequenceRow::find_by_statement(statement(
        NEXT_CODE_SEQUENCE,
        vec![year.into(), division_code.to_owned().into()],
    ))
    .one(txn)
    .await?
    .map(|row| row.last_seq)
    .ok_or_else(|| DbErr::RecordNotFound("project_code_sequences".to_string()))
}

async fn set_realization(
    txn: &DatabaseTransaction,
    project_id: i64,
    month: NaiveDate,
    amount: Decimal,
) -> Result<(), DbErr> {
    project_revenue_plan::Entity::update_many()
        .col_expr(
            project_revenue_plan::Column::TargetRealization,
            sea_orm::sea_query::Expr::value(amount),
        )
        .filter(project_revenue_plan::Column::ProjectId.eq(project_id))
        .filter(project_revenue_plan::Column::Month.eq(month))
        .exec(txn)
        .await?;
    Ok(())
}

fn active_model(project: &ValidatedProject) -> projects::ActiveModel {
    projects::ActiveModel {
        description: Set(project.description.clone()),
        customer_id: Set(project.customer_id),
        division: Set(project.division.as_str().to_owned()),
        status: Set(project.status.as_str().to_owned()),
        project_type: Set(project.project_type.as_str().to_owned()),
        sales_stage: Set(i16::from(project.sales_stage.value())),
        sph_status: Set(project.sph_status.map(|s| s.as_str().to_owned())),
        sph_release_date: Set(project.sph_release_date),
        sph_release_status: Set(project.sph_release_status.as_str().to_owned()),
        sph_number: Set(project.sph_number.clone()),
        sph_status_reason_category: Set(project.reason_category.map(|c| c.as_str().to_owned())),
        sph_status_reason_note: Set(project.reason_note.clone()),
        ..Default::default()
    }
}

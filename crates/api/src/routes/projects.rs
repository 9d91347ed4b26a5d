//! Project routes: CRUD, revenue plans, realization, post-PO monitoring and
//! the CSV export.
//!
//! Every route that addresses a single project loads its scope first and
//! checks the caller's division against it.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    AppState,
    error::{ApiJson, ApiResult, db_error},
    middleware::AuthUser,
};
use salesdesk_core::access::Caller;
use salesdesk_core::export::{ExportFilter, ExportQuery, csv_headers};
use salesdesk_core::month::today_in;
use salesdesk_core::project::{PostPoUpdateDraft, ProjectDraft, ProjectSort};
use salesdesk_core::revenue::{RealizationInput, plan_realization};
use salesdesk_db::repositories::{
    CreatedProject, PostPoMonitoring, ProjectListItem, ProjectRow, ProjectScope, ProjectSummary,
    RevenuePlanItem,
};
use salesdesk_db::{ExportRepository, PostPoRepository, ProjectRepository};
use salesdesk_shared::AppError;

/// Creates the project routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/summary", get(project_summary))
        .route("/projects/export/csv", get(export_csv))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/revenue-plan", get(get_revenue_plan))
        .route("/projects/{id}/realization/{month}", put(update_realization))
        .route("/projects/{id}/postpo-monitoring", put(update_postpo))
}

/// Query parameters for the project list.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Division filter (admins only).
    pub division: Option<String>,
    /// Sort field.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_dir: Option<String>,
}

/// Project with its plan and post-PO state.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectRow,
    pub revenue_plans: Vec<RevenuePlanItem>,
    pub postpo_monitoring: PostPoMonitoring,
}

/// Loads a project's scope and checks the caller may touch it.
async fn authorized_scope(
    repo: &ProjectRepository,
    caller: &Caller,
    id: i64,
) -> ApiResult<ProjectScope> {
    let scope = repo.scope(id).await?;
    caller.ensure_can_access(&scope.division)?;
    Ok(scope)
}

/// POST /projects
async fn create_project(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(draft): ApiJson<ProjectDraft>,
) -> ApiResult<(StatusCode, Json<CreatedProject>)> {
    let division = caller.assign_division(&draft.division)?;
    let project = draft.validate(division)?;
    let year = today_in(state.timezone).year();

    let created = ProjectRepository::new(state.conn())
        .create_with_plans(&project, year)
        .await?;
    info!(
        project_id = %created.id,
        user_id = %caller.user_id,
        "Project created via API"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /projects
async fn list_projects(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ProjectListItem>>> {
    let division = caller.scoped_division(query.division.as_deref())?;
    let sort = ProjectSort::parse(query.sort_by.as_deref(), query.sort_dir.as_deref());

    let projects = ProjectRepository::new(state.conn())
        .list(division.as_deref(), sort)
        .await
        .map_err(db_error)?;
    Ok(Json(projects))
}

/// GET /projects/summary
async fn project_summary(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ProjectSummary>> {
    let division = caller.scoped_division(query.division.as_deref())?;
    let summary = ProjectRepository::new(state.conn())
        .summary(division.as_deref())
        .await
        .map_err(db_error)?;
    Ok(Json(summary))
}

/// GET /projects/export/csv
async fn export_csv(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = ExportFilter::resolve(&query, &caller, today_in(state.timezone))?;
    let rows = ExportRepository::new(state.conn())
        .rows(&filter)
        .await
        .map_err(db_error)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_headers()).map_err(csv_error)?;
    for row in &rows {
        writer.write_record(row.to_record()).map_err(csv_error)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("csv flush failed: {e}")))?;

    info!(
        user_id = %caller.user_id,
        year = filter.year,
        rows = rows.len(),
        "Projects exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filter.filename()),
            ),
        ],
        body,
    ))
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::Internal(format!("csv write failed: {err}"))
}

/// GET /projects/{id}
async fn get_project(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProjectDetail>> {
    let repo = ProjectRepository::new(state.conn());
    authorized_scope(&repo, &caller, id).await?;

    let project = repo.find(id).await?;
    let revenue_plans = repo.revenue_plans(id).await.map_err(db_error)?;
    let postpo_monitoring = PostPoRepository::new(state.conn())
        .find(id)
        .await
        .map_err(db_error)?;

    Ok(Json(ProjectDetail {
        project,
        revenue_plans,
        postpo_monitoring,
    }))
}

/// PUT /projects/{id}
async fn update_project(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    ApiJson(draft): ApiJson<ProjectDraft>,
) -> ApiResult<Json<Value>> {
    let repo = ProjectRepository::new(state.conn());
    authorized_scope(&repo, &caller, id).await?;

    let division = caller.assign_division(&draft.division)?;
    let project = draft.validate(division)?;
    repo.update_with_plans(id, &project).await?;

    info!(project_id = %id, user_id = %caller.user_id, "Project updated via API");
    Ok(Json(json!({ "status": "ok" })))
}

/// DELETE /projects/{id}
async fn delete_project(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let repo = ProjectRepository::new(state.conn());
    authorized_scope(&repo, &caller, id).await?;

    repo.delete(id).await?;
    info!(project_id = %id, user_id = %caller.user_id, "Project deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /projects/{id}/revenue-plan
async fn get_revenue_plan(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<RevenuePlanItem>>> {
    let repo = ProjectRepository::new(state.conn());
    authorized_scope(&repo, &caller, id).await?;

    let plans = repo.revenue_plans(id).await.map_err(db_error)?;
    Ok(Json(plans))
}

/// PUT /projects/{id}/realization/{month}
async fn update_realization(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((id, month)): Path<(i64, String)>,
    ApiJson(input): ApiJson<RealizationInput>,
) -> ApiResult<Json<Value>> {
    let plan = plan_realization(&month, &input)?;

    let repo = ProjectRepository::new(state.conn());
    authorized_scope(&repo, &caller, id).await?;
    repo.apply_realization(id, &plan).await.map_err(db_error)?;

    Ok(Json(json!({ "status": "ok" })))
}

/// PUT /projects/{id}/postpo-monitoring
async fn update_postpo(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    ApiJson(draft): ApiJson<PostPoUpdateDraft>,
) -> ApiResult<Json<PostPoMonitoring>> {
    let repo = ProjectRepository::new(state.conn());
    let scope = authorized_scope(&repo, &caller, id).await?;

    let update = draft.validate(i32::from(scope.sales_stage))?;
    let monitoring = PostPoRepository::new(state.conn())
        .update_stage(id, &update)
        .await
        .map_err(db_error)?;

    Ok(Json(monitoring))
}

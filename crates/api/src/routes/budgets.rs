//! Budget management routes.
//!
//! Budgets belong to a division and a month. Division-scoped callers can only
//! see and change their own division's budgets.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    error::{ApiJson, ApiResult, db_error},
    middleware::AuthUser,
};
use salesdesk_core::access::Caller;
use salesdesk_core::budget::{
    BudgetService, CreateBudgetInput, CreateRealizationInput, UpdateBudgetInput,
    UpdateRealizationInput,
};
use salesdesk_db::BudgetRepository;
use salesdesk_db::entities::{budget_realization, budgets};
use salesdesk_db::repositories::{BudgetDetail, BudgetView, TrendPoint};
use salesdesk_shared::AppError;

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/trend", get(budget_trend))
        .route("/budgets/{budget_id}", get(get_budget).put(update_budget))
        .route("/budgets/{budget_id}/realizations", post(add_realization))
        .route(
            "/budgets/{budget_id}/realizations/{realization_id}",
            put(update_realization).delete(delete_realization),
        )
}

/// Query parameters for listing budgets.
#[derive(Debug, Default, Deserialize)]
pub struct ListBudgetsQuery {
    /// Division filter (admins only).
    pub division: Option<String>,
    /// Calendar year.
    pub year: Option<String>,
}

/// Query parameters for the budget trend.
#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    /// Calendar year, required.
    pub year: Option<String>,
    /// Division, required for admins.
    pub division: Option<String>,
}

fn parse_year(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    match raw.map(str::trim).filter(|y| !y.is_empty()) {
        None => Ok(None),
        Some(y) => y
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation("invalid year".into())),
    }
}

/// Loads a budget and checks the caller may touch it.
async fn authorized_budget(
    repo: &BudgetRepository,
    caller: &Caller,
    budget_id: i64,
) -> ApiResult<BudgetView> {
    let budget = repo.find(budget_id).await?;
    caller.ensure_can_access(&budget.division)?;
    Ok(budget)
}

/// POST /budgets
async fn create_budget(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<CreateBudgetInput>,
) -> ApiResult<(StatusCode, Json<budgets::Model>)> {
    let division = caller.assign_division(&payload.division)?;
    let budget = BudgetService::validate_new(&payload, division)?;

    let created = BudgetRepository::new(state.conn()).create(&budget).await?;
    info!(
        budget_id = %created.id,
        division = %created.division,
        user_id = %caller.user_id,
        "Budget created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /budgets
async fn list_budgets(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListBudgetsQuery>,
) -> ApiResult<Json<Vec<BudgetView>>> {
    let division = caller.scoped_division(query.division.as_deref())?;
    let year = parse_year(query.year.as_deref())?;

    let budgets = BudgetRepository::new(state.conn())
        .list(division.as_deref(), year)
        .await
        .map_err(db_error)?;
    Ok(Json(budgets))
}

/// GET /budgets/trend
async fn budget_trend(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Json<Vec<TrendPoint>>> {
    let year = parse_year(query.year.as_deref())?
        .ok_or_else(|| AppError::Validation("year is required".into()))?;
    let division = caller
        .scoped_division(query.division.as_deref())?
        .ok_or_else(|| AppError::Validation("division is required".into()))?;

    let trend = BudgetRepository::new(state.conn())
        .trend(&division, year)
        .await
        .map_err(db_error)?;
    Ok(Json(trend))
}

/// GET /budgets/{budget_id}
async fn get_budget(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(budget_id): Path<i64>,
) -> ApiResult<Json<BudgetDetail>> {
    let detail = BudgetRepository::new(state.conn()).detail(budget_id).await?;
    caller.ensure_can_access(&detail.budget.division)?;
    Ok(Json(detail))
}

/// PUT /budgets/{budget_id}
async fn update_budget(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(budget_id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateBudgetInput>,
) -> ApiResult<Json<BudgetView>> {
    let repo = BudgetRepository::new(state.conn());
    authorized_budget(&repo, &caller, budget_id).await?;

    let updated = repo.update_amount(budget_id, payload.budget_amount).await?;
    info!(budget_id = %budget_id, user_id = %caller.user_id, "Budget updated via API");
    Ok(Json(updated))
}

/// POST /budgets/{budget_id}/realizations
async fn add_realization(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(budget_id): Path<i64>,
    ApiJson(payload): ApiJson<CreateRealizationInput>,
) -> ApiResult<(StatusCode, Json<budget_realization::Model>)> {
    let repo = BudgetRepository::new(state.conn());
    authorized_budget(&repo, &caller, budget_id).await?;

    let realization = repo.add_realization(budget_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(realization)))
}

/// PUT /budgets/{budget_id}/realizations/{realization_id}
async fn update_realization(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((budget_id, realization_id)): Path<(i64, i64)>,
    ApiJson(payload): ApiJson<UpdateRealizationInput>,
) -> ApiResult<Json<budget_realization::Model>> {
    let repo = BudgetRepository::new(state.conn());
    authorized_budget(&repo, &caller, budget_id).await?;

    let realization = repo
        .update_realization(budget_id, realization_id, &payload)
        .await?;
    info!(
        budget_id = %budget_id,
        realization_id = %realization_id,
        user_id = %caller.user_id,
        "Budget realization updated"
    );
    Ok(Json(realization))
}

/// DELETE /budgets/{budget_id}/realizations/{realization_id}
async fn delete_realization(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((budget_id, realization_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let repo = BudgetRepository::new(state.conn());
    authorized_budget(&repo, &caller, budget_id).await?;

    repo.delete_realization(budget_id, realization_id).await?;
    info!(
        budget_id = %budget_id,
        realization_id = %realization_id,
        user_id = %caller.user_id,
        "Budget realization deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::StatusCode;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use serde_json::json;

    use crate::test_support::{empty_state, json_body, send, state_with, token};
    use salesdesk_db::entities::budget_realization;

    fn budget_row(division: &str) -> BTreeMap<&'static str, Value> {
        let now = Utc::now().fixed_offset();
        BTreeMap::from([
            ("id", Value::from(5_i64)),
            ("division", Value::from(division.to_string())),
            (
                "month",
                Value::from(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            ),
            ("budget_amount", Value::from(dec!(1000))),
            ("total_realization", Value::from(dec!(250))),
            ("created_at", Value::from(now)),
            ("updated_at", Value::from(now)),
        ])
    }

    #[tokio::test]
    async fn test_trend_requires_year() {
        let state = empty_state();
        let token = token(&state, 2, "user", "NetCo");

        let response = send(state, "GET", "/api/budgets/trend", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "year is required");
    }

    #[tokio::test]
    async fn test_trend_rejects_all_for_admin() {
        let state = empty_state();
        let token = token(&state, 1, "admin", "");

        let response = send(
            state,
            "GET",
            "/api/budgets/trend?year=2025&division=ALL",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "division is required");
    }

    #[tokio::test]
    async fn test_get_budget_returns_rollup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![budget_row("NetCo")]])
            .append_query_results([Vec::<budget_realization::Model>::new()])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 2, "user", "NetCo");

        let response = send(state, "GET", "/api/budgets/5", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["budget"]["month"], "2025-03");
        assert_eq!(body["budget"]["remaining"], "750");
        assert_eq!(body["realization"], json!([]));
    }

    #[tokio::test]
    async fn test_user_cannot_touch_other_division_budget() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![budget_row("IT Solutions")]])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 2, "user", "NetCo");

        let response = send(
            state,
            "PUT",
            "/api/budgets/5",
            Some(&token),
            Some(json!({ "budget_amount": 2000 })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_month() {
        let state = empty_state();
        let token = token(&state, 2, "user", "NetCo");

        let response = send(
            state,
            "POST",
            "/api/budgets",
            Some(&token),
            Some(json!({ "month": "March", "budget_amount": 100 })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

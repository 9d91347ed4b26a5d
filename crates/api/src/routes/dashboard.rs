//! Dashboard route.

use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::Query;
use tracing::debug;

use crate::{
    AppState,
    error::{ApiResult, db_error},
    middleware::AuthUser,
};
use salesdesk_core::dashboard::{BudgetFilter, DashboardQuery, DashboardResponse, ProjectFilter};
use salesdesk_core::month::today_in;
use salesdesk_db::DashboardRepository;

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET /dashboard
///
/// `status`, `sales_stage` and `project_type` may be repeated, which is why
/// the query goes through `axum_extra`'s extractor.
async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let today = today_in(state.timezone);
    let projects = ProjectFilter::resolve(&query, &caller, today)?;
    let budgets = BudgetFilter::resolve(&query, &caller, today)?;

    debug!(
        division = ?projects.division,
        from = %projects.range.from,
        to = %projects.range.to,
        "Loading dashboard"
    );

    let dashboard = DashboardRepository::new(state.conn())
        .load(&projects, &budgets)
        .await
        .map_err(db_error)?;
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::StatusCode;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use crate::test_support::{empty_state, json_body, send, state_with, token};

    type Row = BTreeMap<&'static str, Value>;

    fn label_value(label: &str, value: rust_decimal::Decimal) -> Row {
        BTreeMap::from([
            ("label", Value::from(label.to_string())),
            ("value", Value::from(value)),
        ])
    }

    fn kpi_row() -> Row {
        let zero = || Value::from(dec!(0));
        BTreeMap::from([
            ("total_sales_real", Value::from(dec!(250))),
            ("baseline_target", Value::from(dec!(1000))),
            ("carry_real", zero()),
            ("carry_target", zero()),
            ("pb_real", Value::from(dec!(250))),
            ("pb_target", Value::from(dec!(1000))),
            ("rec_real", zero()),
            ("rec_target", zero()),
            ("newrec_real", zero()),
            ("newrec_target", zero()),
            ("opp_target", Value::from(dec!(1000))),
        ])
    }

    fn stage_row(stage: i16, count: i64, target: rust_decimal::Decimal) -> Row {
        BTreeMap::from([
            ("stage", Value::from(stage)),
            ("count", Value::from(count)),
            ("target_revenue", Value::from(target)),
        ])
    }

    /// Result sets in the order the dashboard queries run.
    fn dashboard_results() -> Vec<Vec<Row>> {
        vec![
            vec![kpi_row()],
            vec![BTreeMap::from([
                ("total_target_revenue", Value::from(dec!(1000))),
                ("total_realization", Value::from(dec!(250))),
                ("total_projects", Value::from(3_i64)),
            ])],
            vec![stage_row(2, 2, dec!(600)), stage_row(6, 1, dec!(400))],
            vec![label_value("NetCo", dec!(1000))],
            vec![label_value("Prospect", dec!(1000))],
            vec![label_value("Project Based", dec!(1000))],
            vec![label_value("PT Acme", dec!(250))],
            vec![BTreeMap::from([
                ("month", Value::from("2025-01".to_string())),
                ("target", Value::from(dec!(500))),
                ("realization", Value::from(dec!(250))),
            ])],
            vec![BTreeMap::from([
                ("id", Value::from(7_i64)),
                ("name", Value::from("Core router refresh".to_string())),
                ("target_revenue", Value::from(dec!(400))),
            ])],
            vec![BTreeMap::from([
                ("total_budget", Value::from(dec!(2000))),
                ("total_realization", Value::from(dec!(500))),
            ])],
            vec![BTreeMap::from([
                ("customer", Value::from("PT Acme".to_string())),
                ("total_target", Value::from(dec!(1000))),
                ("total_real", Value::from(dec!(250))),
            ])],
        ]
    }

    #[tokio::test]
    async fn test_dashboard_returns_every_section() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(dashboard_results())
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 1, "admin", "");

        let response = send(
            state,
            "GET",
            "/api/dashboard?from=2025-01&to=2025-12",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["kpis"]["total_sales"]["value"], "250");
        assert_eq!(body["kpis"]["opportunity"]["target"], "1000");
        assert_eq!(body["totals"]["total_projects"], 3);

        let stages = body["pipeline"]["stages"].as_array().unwrap();
        assert_eq!(stages.len(), 6);
        assert_eq!(stages[1]["count"], 2);
        assert_eq!(stages[5]["count"], 1);
        assert_eq!(stages[0]["count"], 0);

        assert_eq!(body["division_breakdown"][0]["label"], "NetCo");
        assert_eq!(body["customer_contribution"][0]["label"], "PT Acme");
        assert_eq!(body["forecast"][0]["month"], "2025-01");
        assert_eq!(body["top_projects"][0]["name"], "Core router refresh");
        assert_eq!(body["budget"]["total_budget"], "2000");
        assert_eq!(body["customer_table"][0]["total_real"], "250");
    }

    #[tokio::test]
    async fn test_dashboard_forces_user_division_into_every_query() {
        let empty: Vec<Vec<Row>> = vec![Vec::new(); 11];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(empty)
            .into_connection();
        let state = state_with(db);
        let log = state.db.clone();
        let token = token(&state, 2, "user", "netco");

        let response = send(
            state,
            "GET",
            "/api/dashboard?division=IT%20Solutions",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let transactions = (*log).clone().into_transaction_log();
        assert_eq!(transactions.len(), 11);

        let own = Value::from("NetCo".to_string());
        let requested = Value::from("IT Solutions".to_string());
        for stmt in transactions.iter().flat_map(|t| t.statements().to_vec()) {
            let values = stmt.values.map(|v| v.0).unwrap_or_default();
            assert!(stmt.sql.contains("division = $1"), "{}", stmt.sql);
            assert_eq!(values[0], own);
            assert!(!values.contains(&requested));
        }
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_range() {
        let state = empty_state();
        let token = token(&state, 1, "admin", "");

        let response = send(
            state,
            "GET",
            "/api/dashboard?from=2025-99&to=2025-12",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_user_without_division_is_forbidden() {
        let state = empty_state();
        let token = token(&state, 4, "user", "");

        let response = send(state, "GET", "/api/dashboard", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await["message"],
            "missing division in token"
        );
    }

    #[tokio::test]
    async fn test_dashboard_requires_token() {
        let response = send(empty_state(), "GET", "/api/dashboard", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

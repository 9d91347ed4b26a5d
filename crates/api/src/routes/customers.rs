//! Customer routes.
//!
//! Customers are shared across divisions: any authenticated caller can read
//! and maintain them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::info;

use crate::{
    AppState,
    error::{ApiJson, ApiResult, db_error},
    middleware::AuthUser,
};
use salesdesk_core::customer::{CustomerPatch, NewCustomer};
use salesdesk_db::{CustomerRepository, entities::customers};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn list_customers(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> ApiResult<Json<Vec<customers::Model>>> {
    let customers = CustomerRepository::new(state.conn())
        .list()
        .await
        .map_err(db_error)?;
    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<customers::Model>> {
    let customer = CustomerRepository::new(state.conn()).find(id).await?;
    Ok(Json(customer))
}

async fn create_customer(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<customers::Model>)> {
    let input = payload.validate()?;
    let customer = CustomerRepository::new(state.conn())
        .create(input)
        .await
        .map_err(db_error)?;
    info!(customer_id = %customer.id, user_id = %caller.user_id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CustomerPatch>,
) -> ApiResult<Json<customers::Model>> {
    let patch = payload.validate()?;
    let customer = CustomerRepository::new(state.conn()).update(id, patch).await?;
    info!(customer_id = %id, user_id = %caller.user_id, "Customer updated");
    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    CustomerRepository::new(state.conn()).delete(id).await?;
    info!(customer_id = %id, user_id = %caller.user_id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use crate::test_support::{empty_state, json_body, send, state_with, token};
    use salesdesk_db::entities::customers;

    fn customer(id: i64, name: &str) -> customers::Model {
        let now = chrono::Utc::now().into();
        customers::Model {
            id,
            name: name.to_string(),
            industry: Some("Telecommunication".to_string()),
            region: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_customers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer(1, "Acme"), customer(2, "Borneo Tel")]])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 2, "user", "NetCo");

        let response = send(state, "GET", "/api/customers", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["name"], "Borneo Tel");
    }

    #[tokio::test]
    async fn test_get_missing_customer_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 1, "admin", "");

        let response = send(state, "GET", "/api/customers/42", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let state = empty_state();
        let token = token(&state, 1, "admin", "");

        let response = send(
            state,
            "POST",
            "/api/customers",
            Some(&token),
            Some(json!({ "name": "   " })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! User management routes (admin only).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use tracing::info;

use crate::{
    AppState,
    error::{ApiJson, ApiResult, db_error},
    middleware::AuthUser,
};
use salesdesk_core::auth::{UserInput, hash_password};
use salesdesk_db::{UserRepository, entities::users};
use salesdesk_shared::AppError;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

/// GET /users
async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<users::Model>>> {
    caller.require_admin()?;
    let users = UserRepository::new(state.conn())
        .list()
        .await
        .map_err(db_error)?;
    Ok(Json(users))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<UserInput>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    caller.require_admin()?;
    let user = payload.validate_new()?;
    let password = user.password.as_deref().unwrap_or_default();
    let hash = hash_password(password)?;

    let created = UserRepository::new(state.conn()).create(&user, &hash).await?;
    info!(user_id = %created.id, created_by = %caller.user_id, "User created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /users/{id}
async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UserInput>,
) -> ApiResult<Json<users::Model>> {
    caller.require_admin()?;
    let user = payload.validate()?;
    let hash = user.password.as_deref().map(hash_password).transpose()?;

    let updated = UserRepository::new(state.conn())
        .update(id, &user, hash.as_deref())
        .await?;
    info!(user_id = %id, updated_by = %caller.user_id, "User updated");

    Ok(Json(updated))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    caller.require_admin()?;
    if id == caller.user_id {
        return Err(AppError::Validation("cannot delete your own account".into()).into());
    }

    UserRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %id, deleted_by = %caller.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    use crate::test_support::{empty_state, json_body, send, state_with, token};
    use salesdesk_db::entities::users;

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let state = empty_state();
        let token = token(&state, 2, "user", "NetCo");

        let response = send(state, "GET", "/api/users", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["message"], "admin only");
    }

    #[tokio::test]
    async fn test_list_never_exposes_password_hash() {
        let now = chrono::Utc::now().into();
        let row = users::Model {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$argon2id$v=19$stored".to_string(),
            role: "admin".to_string(),
            division: "All".to_string(),
            created_at: now,
            updated_at: now,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 1, "admin", "");

        let response = send(state, "GET", "/api/users", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["username"], "admin");
        assert!(body[0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_update_route_is_admin_only() {
        let state = empty_state();
        let token = token(&state, 2, "user", "NetCo");

        let response = send(
            state,
            "PUT",
            "/api/users/5",
            Some(&token),
            Some(json!({ "username": "budi", "role": "user", "division": "netco" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_requires_password() {
        let state = empty_state();
        let token = token(&state, 1, "admin", "");

        let response = send(
            state,
            "POST",
            "/api/users",
            Some(&token),
            Some(json!({ "username": "budi", "role": "user", "division": "netco" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "password is required");
    }

    #[tokio::test]
    async fn test_self_delete_is_rejected() {
        let state = empty_state();
        let token = token(&state, 1, "admin", "");

        let response = send(state, "DELETE", "/api/users/1", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 1, "admin", "");

        let response = send(state, "DELETE", "/api/users/99", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let state = state_with(db);
        let token = token(&state, 1, "admin", "");

        let response = send(state, "DELETE", "/api/users/5", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

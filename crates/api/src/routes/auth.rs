//! Authentication routes: login and the current caller.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    AppState,
    error::{ApiJson, ApiResult, db_error},
    middleware::AuthUser,
};
use salesdesk_core::auth::verify_password;
use salesdesk_core::division::normalize_division;
use salesdesk_db::UserRepository;
use salesdesk_shared::{AppError, LoginRequest, LoginResponse};

const INVALID_CREDENTIALS: &str = "invalid username/password";

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Routes that need an authenticated caller.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// POST /login - Authenticate and issue a token.
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("username and password are required".into()).into());
    }

    let repo = UserRepository::new(state.conn());
    let Some(user) = repo.find_by_username(username).await.map_err(db_error)? else {
        info!(username = %username, "Login attempt for non-existent user");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    let division = normalize_division(&user.division);
    let token = state
        .jwt_service
        .generate_token(user.id, &user.role, &division)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        role: user.role,
        division,
        username: user.username,
    }))
}

/// GET /me - Identity carried by the token.
async fn me(AuthUser(caller): AuthUser) -> Json<Value> {
    Json(json!({
        "id": caller.user_id,
        "role": caller.role.as_str(),
        "division": caller.division,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use crate::test_support::{empty_state, json_body, send, state_with, token};
    use salesdesk_core::auth::hash_password;
    use salesdesk_db::entities::users;

    fn user_row(password: &str) -> users::Model {
        let now = chrono::Utc::now().into();
        users::Model {
            id: 7,
            username: "sari".to_string(),
            password_hash: hash_password(password).unwrap(),
            role: "user".to_string(),
            division: "it solution".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_with_canonical_division() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row("s3cret")]])
            .into_connection();
        let state = state_with(db);

        let response = send(
            state.clone(),
            "POST",
            "/api/login",
            None,
            Some(json!({ "username": "sari", "password": "s3cret" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["role"], "user");
        assert_eq!(body["division"], "IT Solutions");
        assert_eq!(body["username"], "sari");

        let claims = state
            .jwt_service
            .validate_token(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.division, "IT Solutions");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row("s3cret")]])
            .into_connection();

        let response = send(
            state_with(db),
            "POST",
            "/api/login",
            None,
            Some(json!({ "username": "sari", "password": "nope" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "invalid username/password");
    }

    #[tokio::test]
    async fn test_login_malformed_body_is_bad_request() {
        let response = send(
            empty_state(),
            "POST",
            "/api/login",
            None,
            Some(json!({ "user": "sari" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let response = send(empty_state(), "GET", "/api/me", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "missing_token");
    }

    #[tokio::test]
    async fn test_me_rejects_garbage_token() {
        let response = send(empty_state(), "GET", "/api/me", Some("not-a-jwt"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "invalid_token");
    }

    #[tokio::test]
    async fn test_me_returns_normalized_claims() {
        let state = empty_state();
        let token = token(&state, 3, "user", "oil and gas");

        let response = send(state, "GET", "/api/me", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], 3);
        assert_eq!(body["role"], "user");
        assert_eq!(body["division"], "Oil Gas & Mining");
    }
}

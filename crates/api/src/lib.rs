//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware and the `AuthUser` extractor
//! - Error mapping from domain errors to JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::{Json, Router, extract::State, routing::get};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use salesdesk_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Business timezone for "today" and project code years.
    pub timezone: Tz,
    /// Name reported by the root endpoint.
    pub service_name: Arc<str>,
}

impl AppState {
    /// Clones the pooled connection for a repository.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "service": &*state.service_name }))
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router and token helpers for handler tests.

    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response, header::AUTHORIZATION},
    };
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::Value;
    use tower::ServiceExt;

    use salesdesk_shared::{JwtConfig, JwtService};

    use super::{AppState, create_router};

    pub fn state_with(db: DatabaseConnection) -> AppState {
        AppState {
            db: Arc::new(db),
            jwt_service: Arc::new(JwtService::new(JwtConfig::default())),
            timezone: chrono_tz::Asia::Jakarta,
            service_name: Arc::from("salesdesk-backend"),
        }
    }

    pub fn empty_state() -> AppState {
        state_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    pub fn token(state: &AppState, user_id: i64, role: &str, division: &str) -> String {
        state
            .jwt_service
            .generate_token(user_id, role, division)
            .expect("should generate token")
    }

    pub async fn send(
        state: AppState,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let app: Router = create_router(state);
        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}

//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod budgets;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod users;

/// Creates the `/api` router; everything except login requires a token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(customers::routes())
        .merge(projects::routes())
        .merge(budgets::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(auth::routes())
        .merge(protected_routes)
}

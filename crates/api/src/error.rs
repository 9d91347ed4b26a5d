//! Error responses and the JSON body extractor.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use salesdesk_shared::AppError;

/// An `AppError` rendered as `{"error": CODE, "message": text}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
            "An internal error occurred"
        } else {
            self.0.message()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Maps a raw database error to a 500.
pub fn db_error(err: DbErr) -> ApiError {
    ApiError(AppError::Database(err.to_string()))
}

/// `Json` extractor whose rejection is a 400 in the API error format.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| {
                ApiError(AppError::Validation(format!(
                    "invalid request body: {}",
                    rejection.body_text()
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let (status, body) = render(AppError::Forbidden("admin only".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
        assert_eq!(body["message"], "admin only");
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let (status, body) =
            render(AppError::Database("relation \"projects\" does not exist".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_business_rule_is_bad_request() {
        let (status, _) = render(AppError::BusinessRule("too low".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

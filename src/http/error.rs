//! Mapping of [`MarketError`] onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::MarketError;

#[derive(Debug)]
pub struct ApiError(pub MarketError);

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self { Self(err) }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            MarketError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            MarketError::Authentication(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
            MarketError::Authorization(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
            MarketError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
            MarketError::Storage(msg) => {
                tracing::error!(error = %msg, "storage failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Internal server error")
            }
            MarketError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error")
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("delivery partners unavailable")]
    NoPartnersAvailable,

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "order not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCoordinate(value) => (
                StatusCode::BAD_REQUEST,
                format!("invalid coordinate: {value}"),
            ),
            AppError::NoPartnersAvailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "delivery partners unavailable".to_string(),
            ),
            // Store-level failures stay in the logs; callers only see a
            // generic server error.
            AppError::Transaction(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engage_core::error::{self, ApiError};

/// Internal error type that converts to structured API responses.
///
/// Decisions never fail: analyzer problems become a "no popup" decision inside
/// the core. What is left here is request validation.
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        docs_hint: Option<String>,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                docs_hint,
            } => {
                tracing::debug!(request_id = %request_id, field = ?field, "rejected request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ApiError {
                        error: error::codes::VALIDATION_FAILED.to_string(),
                        message,
                        field,
                        request_id,
                        docs_hint,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}

//! API error type with `IntoResponse`.
//!
//! Store errors map to HTTP status codes; internal failures are logged and
//! answered with a generic body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use speccs_core::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Error raised by the inventory store.
    Store(StoreError),
    /// Malformed request input not covered by extractor rejections (400).
    BadRequest { message: String },
    /// Unexpected server failure (500, logged).
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Store(StoreError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, "validation_error", err.to_string())
            }
            Self::Store(err @ StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            Self::Store(StoreError::Constraint(violation)) => (
                StatusCode::CONFLICT,
                "constraint_violation",
                violation.to_string(),
            ),
            Self::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
            Self::Store(_) | Self::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "an internal error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                Self::Store(err) => {
                    error!("event=http_error module=server status=error kind=store error={err}")
                }
                Self::Internal { message } => {
                    error!("event=http_error module=server status=error kind=internal error={message}")
                }
                Self::BadRequest { .. } => {}
            }
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

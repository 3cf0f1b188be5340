//! Rejections of form submissions
//!
//! Prediction failures never come through here: they become a `Failure`
//! state on the controller. These errors only cover requests to `/predict`
//! that cannot be submitted at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rendered as `{ "error": { "code", "message" } }`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body could not be read as a form or JSON submission
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Field-level rejection such as an empty value
    #[error("{0}")]
    Common(#[from] appraise_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Common(appraise_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVICE_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

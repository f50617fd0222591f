//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vtext_media::{FontResolutionError, MediaError};
use vtext_models::{JobOutcome, ValidationError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Font resolution failed: {0}")]
    FontResolution(#[from] FontResolutionError),

    /// The job ran and failed; the outcome is the response body.
    #[error("Job failed: {}", .0.state)]
    JobFailed(Box<JobOutcome>),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::FontResolution(_) | ApiError::JobFailed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Media(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "invalid_input",
            ApiError::FontResolution(_) => "font_resolution",
            ApiError::JobFailed(_) => "job_failed",
            ApiError::Media(_) | ApiError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let detail = match self {
            ApiError::JobFailed(outcome) => return (status, Json(*outcome)).into_response(),
            // Don't expose internal error details in production
            ApiError::Media(_) | ApiError::Internal(_)
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" =>
            {
                "An internal error occurred".to_string()
            }
            ref other => other.to_string(),
        };

        let body = ErrorResponse {
            detail,
            code: Some(code.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

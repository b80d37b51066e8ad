use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use adpulse_core::{CoreError, InvalidInputError};

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The reporting source could not be reached or returned an error.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The reporting source answered, but its totals cannot be aggregated.
    #[error(transparent)]
    InvalidReportData(#[from] InvalidInputError),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(inner) => AppError::InvalidReportData(inner),
            CoreError::InvalidWindow { .. }
            | CoreError::InvalidDate(_)
            | CoreError::EmptyWindow
            | CoreError::DateOutOfRange => AppError::BadRequest(err.to_string()),
            CoreError::Serialization(_) | CoreError::MalformedRow { .. } => {
                AppError::Upstream(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "Reporting source unavailable".to_string(),
            ),
            AppError::InvalidReportData(e) => {
                field = Some(format!("{}[{}]", e.window, e.index));
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "invalid_report_data",
                    e.to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}

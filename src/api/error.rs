use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::DomainError;

/// Two-bucket taxonomy: bad input maps to 400, everything else to 500 with
/// the error text echoed in `detail`, matching the original service's
/// exception-to-HTTP translation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::InvalidRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {detail}"),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::InvalidRequest(msg),
            DomainError::Internal(msg) | DomainError::ExternalService(msg) => Self::Internal(msg),
        }
    }
}

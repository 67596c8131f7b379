/*
 * Responsibility
 * - Land service error type and its JSON response
 * - Access decisions (401/403/404) pass through unchanged from the core
 * - Database failures are logged here and surface as a bare 500
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use market_auth::AccessError;
use market_auth::error::error_response;
use thiserror::Error;
use tracing::error;

use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::Access(AccessError::NotFound { resource })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest { code, message } => {
                error_response(StatusCode::BAD_REQUEST, code, message)
            }
            AppError::Access(e) => e.into_response(),
            AppError::Internal => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error",
            ),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        error!(error = %e, "land store failure");
        AppError::Internal
    }
}

/*
 * Responsibility
 * - User service error type and its JSON response
 * - Access decisions from the core (401/403/404) pass through unchanged
 * - Internal causes are logged where they happen; clients get a fixed message
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use market_auth::{AccessError, TokenError};
use market_auth::error::error_response;
use thiserror::Error;
use tracing::error;

use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },

    /// Wrong email or wrong password; deliberately the same answer for both.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{code}: {message}")]
    Forbidden { code: &'static str, message: String },

    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::bad_request("VALIDATION_ERROR", message)
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
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
            AppError::InvalidCredentials => error_response(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "invalid email or password",
            ),
            AppError::Forbidden { code, message } => {
                error_response(StatusCode::FORBIDDEN, code, message)
            }
            AppError::Conflict { code, message } => {
                error_response(StatusCode::CONFLICT, code, message)
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
        match e {
            RepoError::Conflict => AppError::conflict("CONFLICT", "conflict"),
            RepoError::Db(e) => {
                error!(error = %e, "user store failure");
                AppError::Internal
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        error!(error = %e, "failed to mint access token");
        AppError::Internal
    }
}

/*
 * Responsibility
 * - Access-control outcomes that end a request (401 / 403 / 404)
 * - Shared JSON error envelope so every service answers in the same shape
 * - Bodies are fixed strings: the reason a credential failed is logged, never returned
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Build the standard error response. Services reuse this for their own errors.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: ErrorBody {
            code: code.to_string(),
            message: message.into(),
        },
    };
    (status, Json(body)).into_response()
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// No valid identity could be established.
    #[error("unauthorized")]
    Unauthorized,
    /// Identity is fine but lacks the required role.
    #[error("insufficient role")]
    MissingRole,
    /// Identity is fine but does not own the resource.
    #[error("not the owner of this {resource}")]
    NotOwner { resource: &'static str },
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthorized => StatusCode::UNAUTHORIZED,
            AccessError::MissingRole | AccessError::NotOwner { .. } => StatusCode::FORBIDDEN,
            AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AccessError::Unauthorized => "UNAUTHORIZED",
            AccessError::MissingRole | AccessError::NotOwner { .. } => "FORBIDDEN",
            AccessError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.code(), self.to_string())
    }
}

/*
 * Responsibility
 * - Public /auth handlers: signup, login, email verification
 * - The only handlers reachable without a credential (see routes::policy)
 */
use axum::{extract::State, http::StatusCode};
use market_auth::input::{Json, Query};

use crate::api::v1::dto::auth::{
    LoginRequest, LoginResponse, MessageResponse, ResendVerificationRequest, SignupRequest,
    VerifyEmailQuery, check_email,
};
use crate::api::v1::dto::users::UserResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let user = state.users.signup(req.into_signup()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let session = state.users.login(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Query(q): Query<VerifyEmailQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    if q.token.trim().is_empty() {
        return Err(AppError::validation("token is required"));
    }

    state.users.verify_email(q.token.trim()).await?;
    Ok(Json(MessageResponse {
        message: "email verified",
    }))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    check_email(&req.email).map_err(AppError::validation)?;

    state.users.resend_verification(&req.email).await?;
    Ok(Json(MessageResponse {
        message: "verification email sent",
    }))
}

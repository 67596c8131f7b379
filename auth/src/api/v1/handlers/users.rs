/*
 * Responsibility
 * - /users/me and /users/select-role
 * - The account is always the caller's own (AuthCtx.user_id); there is no id in the path
 */
use axum::extract::State;
use market_auth::Identity;
use market_auth::input::Json;

use crate::api::v1::dto::users::{
    SelectRoleRequest, SelectRoleResponse, UpdateProfileRequest, UserResponse,
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.current_user(&identity).await?;
    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let phone = req.phone_number.as_deref().map(str::trim);
    let user = state
        .users
        .update_profile(&identity, req.full_name.as_deref(), phone)
        .await?;
    Ok(Json(user.into()))
}

pub async fn select_role(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<SelectRoleRequest>,
) -> Result<Json<SelectRoleResponse>, AppError> {
    let session = state.users.select_role(&identity, req.role).await?;
    Ok(Json(SelectRoleResponse::new(req.role, session)))
}

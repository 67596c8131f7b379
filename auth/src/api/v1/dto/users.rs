use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use market_auth::Role;
use serde::{Deserialize, Serialize};

use crate::repos::user_repo::User;
use crate::services::users::Session;

pub const MAX_PHONE_CHARS: usize = 20;

pub(crate) fn check_full_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if (2..=255).contains(&len) {
        Ok(())
    } else {
        Err("full_name must be between 2 and 255 characters")
    }
}

pub(crate) fn check_phone_number(phone: &str) -> Result<(), &'static str> {
    if phone.trim().chars().count() <= MAX_PHONE_CHARS {
        Ok(())
    } else {
        Err("phone_number must be at most 20 characters")
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

impl UpdateProfileRequest {
    /// A blank full_name is allowed here and means "unchanged".
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            check_full_name(name)?;
        }
        if let Some(phone) = &self.phone_number {
            check_phone_number(phone)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectRoleRequest {
    pub role: Role,
}

/// Public view of an account; the password hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub roles: BTreeSet<Role>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            roles: user.roles,
            is_verified: user.is_verified,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectRoleResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

impl SelectRoleResponse {
    pub fn new(role: Role, session: Session) -> Self {
        Self {
            message: format!("role {role} added"),
            user: session.user.into(),
            token: session.token,
        }
    }
}

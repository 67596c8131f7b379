/*
 * Responsibility
 * - /auth request/response DTOs
 * - validate() does shape checks only; uniqueness and credentials are the service's job
 */
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::users::{UserResponse, check_full_name, check_phone_number};
use crate::services::users::{Session, Signup};

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_EMAIL_CHARS: usize = 255;

pub(crate) fn check_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("email is required");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("email must be a valid address");
    };
    if local.is_empty() || domain.is_empty() || email.chars().count() > MAX_EMAIL_CHARS {
        return Err("email must be a valid address");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err("password must be at least 8 characters");
        }
        check_full_name(&self.full_name)?;
        if let Some(phone) = &self.phone_number {
            check_phone_number(phone)?;
        }
        Ok(())
    }

    pub fn into_signup(self) -> Signup {
        Signup {
            email: self.email,
            password: self.password,
            full_name: self.full_name,
            phone_number: self
                .phone_number
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub expires_in: u64,
    #[serde(flatten)]
    pub user: UserResponse,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            token_type: "Bearer",
            expires_in: session.expires_in,
            user: session.user.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

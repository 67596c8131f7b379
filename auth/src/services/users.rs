/*
 * Responsibility
 * - Account use cases: signup, login, email verification, profile, role selection
 * - The only place credentials are minted (login and role change)
 * - "Who is calling" always comes from AuthCtx.user_id, never from a lookup by email
 */
use std::sync::Arc;

use chrono::{Duration, Utc};
use market_auth::{AuthCtx, Role, TokenCodec};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::repos::user_repo::{NewUser, User, UserStore};
use crate::services::mailer::Mailer;
use crate::services::{password, verification};

#[derive(Debug, Clone)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

/// A freshly minted credential and the account it was minted for.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
    mailer: Arc<dyn Mailer>,
    verification_ttl: Duration,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("codec", &self.codec)
            .field("verification_ttl", &self.verification_ttl)
            .finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        codec: Arc<TokenCodec>,
        mailer: Arc<dyn Mailer>,
        verification_ttl: Duration,
    ) -> Self {
        Self {
            store,
            codec,
            mailer,
            verification_ttl,
        }
    }

    pub async fn signup(&self, input: Signup) -> Result<User, AppError> {
        let email = normalize_email(&input.email);
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("EMAIL_TAKEN", "email already registered"));
        }

        let password_hash = password::hash_password(&input.password).map_err(|e| {
            warn!(error = %e, "password hashing failed");
            AppError::Internal
        })?;

        // The unique index still decides if two signups race.
        let user = self
            .store
            .create(NewUser {
                email,
                password_hash,
                full_name: input.full_name.trim().to_string(),
                phone_number: input.phone_number,
            })
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict { .. } => {
                    AppError::conflict("EMAIL_TAKEN", "email already registered")
                }
                other => other,
            })?;

        info!(user_id = user.id, "account created");
        self.issue_verification(&user).await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash) {
            debug!(user_id = user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Forbidden {
                code: "ACCOUNT_DEACTIVATED",
                message: "account is deactivated".into(),
            });
        }

        info!(user_id = user.id, "login");
        self.session_for(user)
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), AppError> {
        let hash = verification::hash_token(token);
        let row = self
            .store
            .find_verification_token(&hash)
            .await?
            .ok_or_else(|| {
                AppError::bad_request("INVALID_VERIFICATION_TOKEN", "invalid verification token")
            })?;

        if row.expires_at <= Utc::now() {
            return Err(AppError::bad_request(
                "VERIFICATION_EXPIRED",
                "verification token has expired",
            ));
        }

        self.store.mark_verified(row.user_id).await?;
        self.store.delete_verification_token(row.user_id).await?;

        info!(user_id = row.user_id, "email verified");
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AppError::not_found("user"))?;

        if user.is_verified {
            return Err(AppError::conflict(
                "ALREADY_VERIFIED",
                "email already verified",
            ));
        }

        self.issue_verification(&user).await
    }

    pub async fn current_user(&self, identity: &AuthCtx) -> Result<User, AppError> {
        self.store
            .find_by_id(identity.user_id)
            .await?
            .ok_or(AppError::not_found("user"))
    }

    pub async fn update_profile(
        &self,
        identity: &AuthCtx,
        full_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<User, AppError> {
        // A blank name means "leave it".
        let full_name = full_name.map(str::trim).filter(|s| !s.is_empty());

        self.store
            .update_profile(identity.user_id, full_name, phone_number)
            .await?
            .ok_or(AppError::not_found("user"))
    }

    /// Adds `role` and mints a credential that carries it.
    pub async fn select_role(&self, identity: &AuthCtx, role: Role) -> Result<Session, AppError> {
        let user = self.current_user(identity).await?;
        if user.roles.contains(&role) || !self.store.add_role(user.id, role).await? {
            return Err(AppError::conflict(
                "ROLE_ALREADY_ASSIGNED",
                format!("user already has role {role}"),
            ));
        }

        let user = self.current_user(identity).await?;
        info!(user_id = user.id, %role, "role selected");
        self.session_for(user)
    }

    fn session_for(&self, user: User) -> Result<Session, AppError> {
        let identity = AuthCtx::new(user.email.clone(), user.id, user.roles.iter().copied());
        let token = self.codec.mint(&identity)?;

        Ok(Session {
            token,
            expires_in: self.codec.ttl_seconds(),
            user,
        })
    }

    async fn issue_verification(&self, user: &User) -> Result<(), AppError> {
        let token = verification::generate_token().map_err(|e| {
            warn!(error = %e, "failed to generate verification token");
            AppError::Internal
        })?;
        let expires_at = Utc::now() + self.verification_ttl;

        self.store
            .replace_verification_token(user.id, verification::hash_token(&token), expires_at)
            .await?;

        // Delivery problems must not undo the account; the user can ask again.
        if let Err(e) = self.mailer.send_verification(&user.email, &token).await {
            warn!(user_id = user.id, error = %e, "verification email not sent");
        }
        Ok(())
    }
}

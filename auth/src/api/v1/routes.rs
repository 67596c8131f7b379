/*
 * Responsibility
 * - v1 URL structure for /auth and /users
 * - The route policy table next to the routes it guards; paths are absolute
 *   because the policy layer sits on the outer router
 */
use axum::{
    Router,
    routing::{any, get, post},
};
use market_auth::{Access, AuthorizationPolicy, Rule};

use crate::api::v1::handlers::{auth, health::health, users};
use crate::state::AppState;

pub const PREFIX: &str = "/api/v1";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", any(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify-email", get(auth::verify_email))
        .route("/auth/resend-verification", post(auth::resend_verification))
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/users/select-role", post(users::select_role))
}

/// Account creation and login are public; everything else needs a valid identity.
pub fn policy() -> AuthorizationPolicy {
    let path = |p: &str| format!("{PREFIX}{p}");

    AuthorizationPolicy::new(
        [
            Rule::any("/health", Access::Public),
            Rule::any(&path("/health"), Access::Public),
            Rule::post(&path("/auth/signup"), Access::Public),
            Rule::post(&path("/auth/login"), Access::Public),
            Rule::get(&path("/auth/verify-email"), Access::Public),
            Rule::post(&path("/auth/resend-verification"), Access::Public),
        ],
        Access::Authenticated,
    )
}

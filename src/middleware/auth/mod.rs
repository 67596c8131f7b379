//! Authentication and route-policy layers.
//!
//! Order matters: `access` must run before `policy`, which is why callers
//! should go through [`apply`] rather than layering the two by hand.

pub mod access;
pub mod policy;

use std::sync::Arc;

use axum::Router;

use crate::policy::AuthorizationPolicy;
use crate::token::TokenCodec;

/// Install authentication (outer) and the role gate (inner) on `router`.
///
/// ```ignore
/// let app = Router::new().nest("/api/v1", api::v1::routes()).with_state(state);
/// let app = middleware::auth::apply(app, codec, policy);
/// ```
pub fn apply(router: Router, codec: Arc<TokenCodec>, policy: Arc<AuthorizationPolicy>) -> Router {
    // Later layers wrap earlier ones, so the policy layer goes on first.
    let router = policy::apply(router, policy);
    access::apply(router, codec)
}

//! Route policy gate: runs after authentication, before any handler.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::debug;

use crate::error::AccessError;
use crate::identity::AuthCtx;
use crate::policy::AuthorizationPolicy;

pub fn apply(router: Router, policy: Arc<AuthorizationPolicy>) -> Router {
    router.layer(middleware::from_fn_with_state(policy, enforce))
}

pub async fn enforce(
    State(policy): State<Arc<AuthorizationPolicy>>,
    OriginalUri(original_uri): OriginalUri,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AccessError> {
    let identity = req.extensions().get::<AuthCtx>();

    if let Err(err) = policy.check(req.method(), original_uri.path(), identity) {
        debug!(
            method = %req.method(),
            path = %original_uri.path(),
            user_id = identity.map(|i| i.user_id),
            error = %err,
            "route policy rejected request"
        );
        return Err(err);
    }

    Ok(next.run(req).await)
}

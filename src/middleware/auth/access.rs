//! Bearer credential -> `AuthCtx` in request extensions.
//!
//! Two outcomes per request:
//! - no bearer credential: continue anonymous; the policy layer or the
//!   `Identity` extractor rejects later if the route needs someone
//! - credential present: valid -> `AuthCtx` inserted, invalid -> 401 and the
//!   handler never runs
//!
//! Nothing is cached across requests; every credential is validated again.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::credential;
use crate::error::AccessError;
use crate::token::TokenCodec;

pub fn apply(router: Router, codec: Arc<TokenCodec>) -> Router {
    router.layer(middleware::from_fn_with_state(codec, authenticate))
}

pub async fn authenticate(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AccessError> {
    let Some(token) = credential::from_headers(req.headers()).map(str::to_owned) else {
        debug!(path = %req.uri().path(), "no bearer credential, continuing anonymous");
        return Ok(next.run(req).await);
    };

    let identity = match codec.validate(&token) {
        Ok(identity) => identity,
        Err(err) => {
            // The cause stays in the log; the client only ever sees "unauthorized".
            warn!(error = %err, path = %req.uri().path(), "access token verification failed");
            return Err(AccessError::Unauthorized);
        }
    };

    debug!(user_id = identity.user_id, sub = %identity.subject, "authenticated");

    // middleware -> extractor hand-off
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

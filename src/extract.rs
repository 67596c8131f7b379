/*!
 * Handler-side access to the authenticated identity.
 *
 * The authentication middleware inserts `AuthCtx` into the request extensions;
 * handlers take one of these extractors instead of reaching for any global
 * context. The value is a clone owned by the handler, so mutating it cannot
 * affect anything outside the current call.
 */
use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AccessError;
use crate::identity::AuthCtx;

/// Required identity. Rejects with 401 when the request is anonymous
/// (or when the authentication layer was not installed on this route).
#[derive(Debug, Clone)]
pub struct Identity(pub AuthCtx);

impl Deref for Identity {
    type Target = AuthCtx;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(Identity)
            .ok_or(AccessError::Unauthorized)
    }
}

/// Optional identity for routes that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<AuthCtx>().cloned()))
    }
}

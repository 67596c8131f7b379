//! Resource-level ownership guard.
//!
//! Runs inside business logic, after the resource is loaded and before any
//! mutation. Independent of the role gate: a caller can pass the route policy
//! and still be refused here.
//!
//! Not found is decided before ownership, so callers learn that a resource
//! exists but never get to change someone else's.

use std::future::Future;

use tracing::warn;

use crate::error::AccessError;
use crate::identity::{AuthCtx, UserId};

/// A resource with an immutable creator id.
pub trait OwnedResource {
    /// Used in error messages and logs ("land not found").
    const KIND: &'static str;

    fn owner_id(&self) -> UserId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Allowed,
    Denied,
}

pub fn authorize(owner_id: UserId, user_id: UserId) -> Ownership {
    if owner_id == user_id {
        Ownership::Allowed
    } else {
        Ownership::Denied
    }
}

pub fn ensure_owner<R: OwnedResource>(resource: &R, identity: &AuthCtx) -> Result<(), AccessError> {
    match authorize(resource.owner_id(), identity.user_id) {
        Ownership::Allowed => Ok(()),
        Ownership::Denied => {
            warn!(
                resource = R::KIND,
                owner_id = resource.owner_id(),
                user_id = identity.user_id,
                "ownership check denied"
            );
            Err(AccessError::NotOwner { resource: R::KIND })
        }
    }
}

/// Load a resource for mutation: missing -> 404, someone else's -> 403.
pub async fn load_owned<R, E, F>(identity: &AuthCtx, load: F) -> Result<R, E>
where
    R: OwnedResource,
    E: From<AccessError>,
    F: Future<Output = Result<Option<R>, E>>,
{
    let resource = load
        .await?
        .ok_or(AccessError::NotFound { resource: R::KIND })?;
    ensure_owner(&resource, identity)?;
    Ok(resource)
}

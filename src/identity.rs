/*
 * Responsibility
 * - The identity types handlers see after authentication
 * - The middleware builds `AuthCtx` once per request and puts it in the
 *   request extensions; handlers only ever read it
 */
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric user id issued by the user service (users.id).
pub type UserId = i64;

/// Capability tags carried in the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    LandOwner,
    Farmer,
    Buyer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::LandOwner, Role::Farmer, Role::Buyer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::LandOwner => "LAND_OWNER",
            Role::Farmer => "FARMER",
            Role::Buyer => "BUYER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Authenticated identity for the current request.
///
/// - `subject` is the stable identity string (the account email)
/// - `user_id` is what ownership checks compare against, so it travels inside
///   the signed credential instead of being looked up per request
/// - `roles` is a set; the role gate only asks "holds at least one of"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: String,
    pub user_id: UserId,
    pub roles: BTreeSet<Role>,
}

impl AuthCtx {
    pub fn new(
        subject: impl Into<String>,
        user_id: UserId,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            subject: subject.into(),
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role<'a>(&self, required: impl IntoIterator<Item = &'a Role>) -> bool {
        required.into_iter().any(|r| self.roles.contains(r))
    }
}

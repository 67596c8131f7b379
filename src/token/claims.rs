use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Credential payload as it appears on the wire.
///
/// `userId` and `roles` live in the signed payload so resource services never
/// need a second lookup to learn who the caller is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    // Kept as strings: a role this build does not know must not break decoding.
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    // Correlation only, never checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

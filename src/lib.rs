/*
 * Responsibility
 * - Stateless bearer authentication shared by every service in the workspace
 * - The identity service mints credentials, resource services validate them;
 *   both link this crate and the same `JWT_SECRET`
 *
 * Request flow:
 *   credential::bearer_token -> TokenCodec::validate -> AuthCtx in extensions
 *   -> AuthorizationPolicy (role gate) -> handler -> ownership guard
 */
pub mod config;
pub mod credential;
pub mod error;
pub mod extract;
pub mod identity;
pub mod input;
pub mod middleware;
pub mod ownership;
pub mod policy;
pub mod telemetry;
pub mod token;

pub use config::{AppEnv, AuthConfig, ConfigError};
pub use error::AccessError;
pub use extract::{Identity, MaybeIdentity};
pub use identity::{AuthCtx, Role, UserId};
pub use ownership::{Ownership, OwnedResource};
pub use policy::{Access, AuthorizationPolicy, Rule};
pub use token::{TokenCodec, TokenError};

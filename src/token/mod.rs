//! Signed bearer credentials (HS256 JWT) shared across services.
//!
//! - `claims`: wire payload
//! - `codec`: mint / validate
mod claims;
mod codec;

pub use claims::Claims;
pub use codec::{TokenCodec, TokenError};

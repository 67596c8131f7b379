use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::identity::{AuthCtx, Role};
use crate::token::Claims;

/// Why a credential was rejected (or could not be signed).
///
/// The variants exist for server-side logs. Anything that reaches a client
/// collapses to a single "unauthorized" answer.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("unexpected issuer")]
    InvalidIssuer,
    #[error("missing or empty '{0}' claim")]
    InvalidClaim(&'static str),
    #[error("jwt error: {0}")]
    Jwt(jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::Malformed,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaim("required"),
            _ => Self::Jwt(e),
        }
    }
}

/// Mints and validates credentials with the shared HS256 secret.
///
/// Pure computation over the token and the key: no I/O, no cache, no state
/// that outlives a call. Key material is not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.leeway = 0;
        // Expiry is compared against an explicit `now` in `validate_at`.
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            ttl_seconds: config.access_token_ttl_seconds,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a credential for `identity`, valid from now for the configured window.
    pub fn mint(&self, identity: &AuthCtx) -> Result<String, TokenError> {
        self.mint_at(identity, Utc::now().timestamp())
    }

    pub fn mint_at(&self, identity: &AuthCtx, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: identity.subject.clone(),
            user_id: identity.user_id,
            roles: identity.roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: now,
            exp: self.expiry_from(now)?,
            jti: Some(Uuid::new_v4().to_string()),
        };

        self.sign(&claims)
    }

    fn expiry_from(&self, now: i64) -> Result<i64, TokenError> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(TokenError::InvalidClaim("exp"))
    }

    /// Sign arbitrary claims. `mint_at` is the normal entry point; this exists
    /// for tooling that needs to inspect edge cases.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(TokenError::Sign)
    }

    /// Verify signature, issuer and expiry, then lift the claims into `AuthCtx`.
    pub fn validate(&self, token: &str) -> Result<AuthCtx, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    pub fn validate_at(&self, token: &str, now: i64) -> Result<AuthCtx, TokenError> {
        let claims = self.decode(token)?;

        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenError::InvalidClaim("sub"));
        }
        if claims.user_id <= 0 {
            return Err(TokenError::InvalidClaim("userId"));
        }

        let roles = claims.roles.iter().filter_map(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                debug!(error = %e, sub = %claims.sub, "ignoring role claim");
                None
            }
        });

        Ok(AuthCtx::new(claims.sub.clone(), claims.user_id, roles))
    }

    /// Signature + issuer check only; no expiry or claim-content rules.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn codec_with(secret: &str, issuer: &str) -> TokenCodec {
        TokenCodec::new(&AuthConfig::new(secret, issuer, 600).unwrap())
    }

    fn codec() -> TokenCodec {
        codec_with("0123456789abcdef0123456789abcdef", "land-market")
    }

    fn owner() -> AuthCtx {
        AuthCtx::new("owner@example.com", 7, [Role::LandOwner])
    }

    #[test]
    fn validate_returns_what_was_minted() {
        let codec = codec();
        let identities = [
            owner(),
            AuthCtx::new("buyer@example.com", 42, Vec::new()),
            AuthCtx::new("multi@example.com", i64::MAX, Role::ALL),
        ];

        for identity in identities {
            let token = codec.mint_at(&identity, NOW).unwrap();
            assert_eq!(codec.validate_at(&token, NOW + 1).unwrap(), identity);
        }
    }

    #[test]
    fn minted_payload_carries_numeric_id_and_roles() {
        let codec = codec();
        let token = codec.mint_at(&owner(), NOW).unwrap();
        let claims = codec.decode(&token).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.roles, vec!["LAND_OWNER".to_string()]);
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 600);
        assert_eq!(claims.iss, "land-market");
    }

    #[test]
    fn any_flipped_payload_bit_invalidates() {
        let codec = codec();
        let token = codec.mint_at(&owner(), NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();

        for byte in 0..payload.len() {
            for bit in 0..8 {
                let mut tampered = payload.clone();
                tampered[byte] ^= 1 << bit;
                let forged = format!(
                    "{}.{}.{}",
                    parts[0],
                    URL_SAFE_NO_PAD.encode(&tampered),
                    parts[2]
                );
                assert!(
                    codec.validate_at(&forged, NOW + 1).is_err(),
                    "bit {bit} of byte {byte} went unnoticed"
                );
            }
        }
    }

    #[test]
    fn expired_token_is_rejected_despite_good_signature() {
        let codec = codec();
        let token = codec.mint_at(&owner(), NOW).unwrap();

        // Signature is fine...
        assert!(codec.decode(&token).is_ok());
        // ...but expiry is strict: `now < exp`.
        assert!(matches!(
            codec.validate_at(&token, NOW + 600),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            codec.validate_at(&token, NOW + 10_000),
            Err(TokenError::Expired)
        ));
        assert!(codec.validate_at(&token, NOW + 599).is_ok());
    }

    #[test]
    fn expiry_that_does_not_fit_is_an_error() {
        let codec = codec();
        assert!(matches!(
            codec.mint_at(&owner(), i64::MAX - 1),
            Err(TokenError::InvalidClaim("exp"))
        ));

        let widest = AuthConfig::new(
            "0123456789abcdef0123456789abcdef",
            "land-market",
            crate::config::MAX_ACCESS_TOKEN_TTL_SECONDS,
        )
        .unwrap();
        let codec = TokenCodec::new(&widest);
        let token = codec.mint(&owner()).unwrap();
        assert_eq!(codec.validate(&token).unwrap(), owner());
    }

    #[test]
    fn wall_clock_validate_rejects_old_tokens() {
        let codec = codec();
        let token = codec.mint_at(&owner(), Utc::now().timestamp() - 3_600).unwrap();
        assert!(matches!(codec.validate(&token), Err(TokenError::Expired)));

        let fresh = codec.mint(&owner()).unwrap();
        assert_eq!(codec.validate(&fresh).unwrap(), owner());
    }

    #[test]
    fn foreign_secret_or_issuer_is_rejected() {
        let token = codec().mint_at(&owner(), NOW).unwrap();

        let other_secret = codec_with("ffffffffffffffffffffffffffffffff", "land-market");
        assert!(matches!(
            other_secret.validate_at(&token, NOW),
            Err(TokenError::BadSignature)
        ));

        let other_issuer = codec_with("0123456789abcdef0123456789abcdef", "someone-else");
        assert!(matches!(
            other_issuer.validate_at(&token, NOW),
            Err(TokenError::InvalidIssuer)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        for garbage in ["garbage", "", "a.b.c", "....", "eyJhbGciOiJIUzI1NiJ9..sig"] {
            assert!(codec.validate_at(garbage, NOW).is_err(), "{garbage:?}");
        }
        assert!(matches!(
            codec.validate_at("garbage", NOW),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let codec = codec();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = Claims {
            iss: "land-market".into(),
            sub: "owner@example.com".into(),
            user_id: 7,
            roles: vec!["LAND_OWNER".into()],
            iat: NOW,
            exp: NOW + 600,
            jti: None,
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        assert!(codec.validate_at(&format!("{header}.{payload}."), NOW).is_err());
    }

    #[test]
    fn claim_content_rules() {
        let codec = codec();
        let base = Claims {
            iss: "land-market".into(),
            sub: "owner@example.com".into(),
            user_id: 7,
            roles: vec!["LAND_OWNER".into(), "SUPERUSER".into()],
            iat: NOW,
            exp: NOW + 600,
            jti: None,
        };

        // Unknown roles never grant anything.
        let token = codec.sign(&base).unwrap();
        assert_eq!(codec.validate_at(&token, NOW).unwrap(), owner());

        let blank_sub = Claims {
            sub: "  ".into(),
            ..base.clone()
        };
        assert!(matches!(
            codec.validate_at(&codec.sign(&blank_sub).unwrap(), NOW),
            Err(TokenError::InvalidClaim("sub"))
        ));

        let no_user = Claims {
            user_id: 0,
            ..base
        };
        assert!(matches!(
            codec.validate_at(&codec.sign(&no_user).unwrap(), NOW),
            Err(TokenError::InvalidClaim("userId"))
        ));
    }
}

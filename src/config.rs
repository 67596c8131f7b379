/*
 * Responsibility
 * - Settings every service needs to agree on (signing secret, issuer, token window)
 * - Runtime environment switch (development / production)
 * - Validation happens here so a bad secret stops the process at startup,
 *   never per request
 */
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

/// HS256 keys shorter than the hash output are rejected.
pub const MIN_SECRET_BYTES: usize = 32;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: u64 = 3600;

/// Longest credential window accepted at startup (30 days).
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("JWT_SECRET must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
    WeakSecret(usize),
}

/// Credential settings shared by the identity service and every resource service.
///
/// The secret is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_ttl_seconds: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn new(
        jwt_secret: impl Into<String>,
        issuer: impl Into<String>,
        access_token_ttl_seconds: u64,
    ) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret(jwt_secret.len()));
        }

        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH_ISSUER"));
        }

        if !(1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&access_token_ttl_seconds) {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }

        Ok(Self {
            jwt_secret,
            issuer,
            access_token_ttl_seconds,
        })
    }

    /// Reads `JWT_SECRET`, `AUTH_ISSUER` and `ACCESS_TOKEN_TTL_SECONDS`.
    ///
    /// Callers are expected to have loaded `.env` already (`dotenvy::dotenv()`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = require_env("JWT_SECRET")?;
        let issuer = require_env("AUTH_ISSUER")?;

        let access_token_ttl_seconds =
            parse_env("ACCESS_TOKEN_TTL_SECONDS", DEFAULT_ACCESS_TOKEN_TTL_SECONDS)?;

        Self::new(jwt_secret, issuer, access_token_ttl_seconds)
    }
}

/// Required string setting.
pub fn require_env(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Optional typed setting: unset means `default`, unparsable is an error.
pub fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// `0.0.0.0:$PORT`.
pub fn listen_addr_from_env(default_port: u16) -> Result<SocketAddr, ConfigError> {
    let port = parse_env("PORT", default_port)?;
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

/// Comma-separated `CORS_ALLOWED_ORIGINS`, blanks dropped.
pub fn cors_allowed_origins_from_env() -> Vec<String> {
    split_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let err = AuthConfig::new("too-short", "land-market", 60).unwrap_err();
        assert_eq!(err, ConfigError::WeakSecret(9));
    }

    #[test]
    fn blank_issuer_and_zero_ttl_are_rejected() {
        let secret = "x".repeat(MIN_SECRET_BYTES);
        assert_eq!(
            AuthConfig::new(secret.clone(), "  ", 60).unwrap_err(),
            ConfigError::Invalid("AUTH_ISSUER")
        );
        assert_eq!(
            AuthConfig::new(secret, "land-market", 0).unwrap_err(),
            ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS")
        );
    }

    #[test]
    fn ttl_above_the_cap_is_rejected() {
        let secret = "x".repeat(MIN_SECRET_BYTES);
        assert!(
            AuthConfig::new(secret.clone(), "land-market", MAX_ACCESS_TOKEN_TTL_SECONDS).is_ok()
        );

        for ttl in [MAX_ACCESS_TOKEN_TTL_SECONDS + 1, 1 << 63, u64::MAX] {
            assert_eq!(
                AuthConfig::new(secret.clone(), "land-market", ttl).unwrap_err(),
                ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS")
            );
        }
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = AuthConfig::new("s".repeat(40), "land-market", 60).unwrap();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("ssss"));
        assert!(printed.contains("land-market"));
    }

    #[test]
    fn app_env_and_origins_parse() {
        assert!(AppEnv::parse("PROD").is_production());
        assert!(!AppEnv::parse("staging").is_production());
        assert_eq!(
            split_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}

/*
 * Responsibility
 * - User service settings from the environment (.env is loaded first)
 * - Credential settings come from the shared core; this is the service that mints
 */
use std::net::SocketAddr;

use market_auth::config::{self, AppEnv, AuthConfig, ConfigError};

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;
const MAX_VERIFICATION_TOKEN_TTL_HOURS: i64 = 30 * 24;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub auth: AuthConfig,
    pub database_url: String,
    pub database_max_connections: u32,
    pub verification_token_ttl: chrono::Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let verification_token_ttl = verification_ttl(config::parse_env(
            "VERIFICATION_TOKEN_TTL_HOURS",
            DEFAULT_VERIFICATION_TOKEN_TTL_HOURS,
        )?)?;

        Ok(Config {
            addr: config::listen_addr_from_env(DEFAULT_PORT)?,
            app_env: AppEnv::from_env(),
            auth: AuthConfig::from_env()?,
            database_url: config::require_env("DATABASE_URL")?,
            database_max_connections: config::parse_env(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            verification_token_ttl,
            cors_allowed_origins: config::cors_allowed_origins_from_env(),
        })
    }
}

/// 1 hour up to 30 days.
fn verification_ttl(hours: i64) -> Result<chrono::Duration, ConfigError> {
    if !(1..=MAX_VERIFICATION_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid("VERIFICATION_TOKEN_TTL_HOURS"));
    }
    chrono::Duration::try_hours(hours).ok_or(ConfigError::Invalid("VERIFICATION_TOKEN_TTL_HOURS"))
}

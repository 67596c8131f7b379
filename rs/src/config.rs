/*
 * Responsibility
 * - Land service settings from the environment (.env is loaded first)
 * - Credential settings come from the shared core so both services agree
 */
use std::net::SocketAddr;

use market_auth::config::{self, AppEnv, AuthConfig, ConfigError};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub auth: AuthConfig,
    pub database_url: String,
    pub database_max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            addr: config::listen_addr_from_env(DEFAULT_PORT)?,
            app_env: AppEnv::from_env(),
            auth: AuthConfig::from_env()?,
            database_url: config::require_env("DATABASE_URL")?,
            database_max_connections: config::parse_env(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            cors_allowed_origins: config::cors_allowed_origins_from_env(),
        })
    }
}

/*
 * Responsibility
 * - Load config -> build dependencies -> assemble the Router
 * - Apply middleware: authentication + route policy, HTTP hardening, CORS
 * - Serve with axum::serve()
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::any};
use market_auth::middleware::{self, http::HttpLimits};
use market_auth::{AppEnv, TokenCodec, telemetry};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::repos::user_repo::PgUserStore;
use crate::services::mailer::LogMailer;
use crate::services::users::UserService;
use crate::state::AppState;

pub async fn run() -> Result<()> {
    telemetry::init_tracing("info,user_service=debug,market_auth=info,tower_http=info");
    let config = Config::from_env()?;
    telemetry::init_panic_hook(!config.app_env.is_production());

    info!(
        "starting user-service in {:?} mode on {} (issuer {})",
        config.app_env, config.addr, config.auth.issuer
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let codec = Arc::new(TokenCodec::new(&config.auth));
    let users = UserService::new(
        Arc::new(PgUserStore::new(pool)),
        codec.clone(),
        Arc::new(LogMailer),
        config.verification_token_ttl,
    );
    let app = build_router(
        AppState::new(users),
        codec,
        config.app_env,
        &config.cors_allowed_origins,
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(
    state: AppState,
    codec: Arc<TokenCodec>,
    app_env: AppEnv,
    cors_allowed_origins: &[String],
) -> Router {
    let router = Router::new()
        .route("/health", any(health))
        .nest(api::v1::PREFIX, api::v1::routes())
        .with_state(state);

    let router = middleware::auth::apply(router, codec, Arc::new(api::v1::policy()));
    let router = middleware::http::apply(router, HttpLimits::default());
    middleware::cors::apply(router, app_env, cors_allowed_origins)
}

/*
 * Responsibility
 * - Outbound email seam; delivery itself is not part of this service
 * - LogMailer writes the message to the log so local setups can follow links
 */
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError>;
}

#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        info!(to = %email, "verification email queued");
        debug!(to = %email, path = %format!("/api/v1/auth/verify-email?token={token}"), "verification link");
        Ok(())
    }
}

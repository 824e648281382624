use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Best-effort notification sink. Implementations report failures through
/// the Result, but callers are expected to log and move on; a notification
/// outcome must never decide a request.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Message submission endpoint of the mail API
    pub endpoint: String,
    /// Account user; also the From address
    pub user: String,
    /// App password for the account
    pub password: String,
    /// Fixed operational recipient
    pub to: String,
}

/// Mail-API notifier.
pub struct HttpMailer {
    http: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&serde_json::json!({
                "from": self.config.user,
                "to": self.config.to,
                "subject": subject,
                "text": body,
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| anyhow!("mail transport request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("mail transport returned {}", response.status()));
        }

        tracing::debug!(subject, "notification sent");
        Ok(())
    }
}

/// Stand-in used when no mail transport is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        tracing::info!(subject, body, "notification (mail transport not configured)");
        Ok(())
    }
}

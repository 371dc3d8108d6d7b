//! Outbound notification email
//!
//! Delivery is delegated to a webhook (a transactional email relay). Without a
//! configured webhook messages are only logged.

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can deliver an [`EmailMessage`]
pub trait Notifier {
    fn send(&self, message: &EmailMessage) -> impl Future<Output = Result<(), EmailError>> + Send;
}

#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl EmailClient {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url,
        }
    }
}

impl Notifier for EmailClient {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let Some(url) = &self.webhook_url else {
            info!(to = %message.to, subject = %message.subject, "Email webhook not configured, logging only");
            return Ok(());
        };

        self.http
            .post(url)
            .json(message)
            .send()
            .await?
            .error_for_status()?;

        info!(to = %message.to, subject = %message.subject, "Notification email sent");
        Ok(())
    }
}

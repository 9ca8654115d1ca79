// Webhook notification collaborator: Discord webhook delivery

use crate::errors::NotifyError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::instrument;

/// Notification delivery seam
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a fully-formed message to the configured destination.
    async fn deliver(&self, content: &str) -> Result<(), NotifyError>;
}

/// Discord webhook notifier
///
/// Posts `{"content": "<message>"}` and treats 204 No Content as the only
/// success status, matching Discord's webhook contract.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    /// Create a new notifier with a bounded request timeout
    pub fn new(webhook_url: &str, timeout_seconds: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| {
                NotifyError::RequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    #[instrument(skip(self, content))]
    async fn deliver(&self, content: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        tracing::debug!("Webhook delivered");
        Ok(())
    }
}

/// Render the announcement message for a video
///
/// The search API returns HTML-entity-escaped text, so the channel title is
/// decoded before rendering.
pub fn announcement_message(channel_title: &str, video_id: &str) -> String {
    let channel = html_escape::decode_html_entities(channel_title);
    format!("New video from **{}**\nhttps://youtu.be/{}", channel, video_id)
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned status {0}")]
    Status(u16),
}

/// One completed guest/assistant exchange, handed to the monitoring channel.
#[derive(Debug, Clone)]
pub struct TurnNotification {
    pub conversant_id: String,
    pub guest_message: String,
    pub bot_reply: String,
    pub profile_id: String,
    pub profile_name: String,
    pub occurred_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &TurnNotification) -> Result<(), NotifyError>;
}

static ESCALATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)contact the host|kontakt vert|I don't know|I'm not sure").unwrap()
});

/// Replies that punt to the host or admit uncertainty get flagged so a human
/// can follow up.
pub fn is_escalation(reply: &str) -> bool {
    ESCALATION_PATTERN.is_match(reply)
}

/// Posts turn notifications to an external webhook (e.g. an n8n flow).
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn notify(&self, event: &TurnNotification) -> Result<(), NotifyError> {
        let payload = NotifyPayload {
            guest_phone: event.conversant_id.replace("whatsapp:", ""),
            guest_message: &event.guest_message,
            bot_reply: &event.bot_reply,
            is_escalation: is_escalation(&event.bot_reply),
            timestamp: event.occurred_at.to_rfc3339(),
            profile_id: &event.profile_id,
            profile_name: &event.profile_name,
        };
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Sink used when no webhook URL is configured.
pub struct NoopNotifier;

#[async_trait]
impl NotificationSink for NoopNotifier {
    async fn notify(&self, _event: &TurnNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotifyPayload<'a> {
    guest_phone: String,
    guest_message: &'a str,
    bot_reply: &'a str,
    is_escalation: bool,
    timestamp: String,
    profile_id: &'a str,
    profile_name: &'a str,
}

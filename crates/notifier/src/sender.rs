//! Channel senders: one delivery capability per supported platform.
//!
//! The dispatcher looks up a [`ChannelSender`] by the subscriber's platform tag.
//! Unknown tags, and known platforms whose credential is not configured, resolve
//! to [`NoopSender`], so those subscribers are skipped without an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use popebot_common::config::NotifierConfig;
use popebot_common::error::AppError;
use popebot_common::types::PLATFORM_TELEGRAM;

/// Timeout for a single outbound delivery request.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a delivery attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Skipped,
}

/// A failed delivery to one subscriber.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Rejected by remote ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Delivers text to a channel on one platform.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(&self, channel_id: &str, text: &str) -> Result<DeliveryOutcome, DeliveryError>;
}

/// Sender for platforms that cannot be delivered to.
#[derive(Debug, Default)]
pub struct NoopSender;

#[async_trait]
impl ChannelSender for NoopSender {
    async fn send(&self, _channel_id: &str, _text: &str) -> Result<DeliveryOutcome, DeliveryError> {
        Ok(DeliveryOutcome::Skipped)
    }
}

/// Telegram Bot API `sendMessage` sender.
pub struct TelegramSender {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramSender {
    pub fn new(
        bot_token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        Self::with_timeout(bot_token, api_base, DELIVERY_TIMEOUT)
    }

    /// Build a sender whose requests give up after `timeout`.
    pub fn with_timeout(
        bot_token: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl ChannelSender for TelegramSender {
    async fn send(&self, channel_id: &str, text: &str) -> Result<DeliveryOutcome, DeliveryError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&SendMessageRequest {
                chat_id: channel_id,
                text,
            })
            .send()
            .await
            // The URL embeds the bot token; keep it out of error messages.
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response.json::<TelegramResponse>().await.ok();

        match body {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => {
                Ok(DeliveryOutcome::Delivered)
            }
            other => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: other
                    .and_then(|b| b.description)
                    .unwrap_or_else(|| status.to_string()),
            }),
        }
    }
}

/// Platform tag → sender lookup.
#[derive(Clone)]
pub struct SenderRegistry {
    senders: HashMap<String, Arc<dyn ChannelSender>>,
    fallback: Arc<dyn ChannelSender>,
}

impl SenderRegistry {
    /// An empty registry: every platform resolves to [`NoopSender`].
    pub fn new() -> Self {
        Self {
            senders: HashMap::new(),
            fallback: Arc::new(NoopSender),
        }
    }

    /// Build the registry from configured credentials.
    ///
    /// Fails if a configured sender cannot construct its HTTP client.
    pub fn from_config(config: &NotifierConfig) -> Result<Self, AppError> {
        let mut registry = Self::new();

        match config.telegram_bot_token.as_deref() {
            Some(token) => {
                let sender = TelegramSender::new(token, config.telegram_api_base.clone())
                    .map_err(|e| {
                        AppError::Config(format!("Failed to build Telegram HTTP client: {}", e))
                    })?;
                registry = registry.with_sender(PLATFORM_TELEGRAM, Arc::new(sender));
            }
            None => {
                tracing::info!("TELEGRAM_BOT_TOKEN not set, Telegram subscribers will be skipped");
            }
        }

        Ok(registry)
    }

    pub fn with_sender(mut self, platform: impl Into<String>, sender: Arc<dyn ChannelSender>) -> Self {
        self.senders.insert(platform.into(), sender);
        self
    }

    /// Resolve the sender for a platform tag.
    pub fn resolve(&self, platform: &str) -> &dyn ChannelSender {
        self.senders
            .get(platform)
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    #[cfg(test)]
    fn supports(&self, platform: &str) -> bool {
        self.senders.contains_key(platform)
    }
}

impl Default for SenderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

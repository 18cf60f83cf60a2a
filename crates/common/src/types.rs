use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform tag for Telegram subscribers.
pub const PLATFORM_TELEGRAM: &str = "telegram";

/// A recorded notification.
///
/// `created_at` is serialized as epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    /// Human-readable notification text
    pub notification: String,
    /// Raw inbound payload
    pub payload: serde_json::Value,
    pub read: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A registered delivery target for notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    /// Delivery channel type, e.g. `telegram`
    pub platform: String,
    /// Platform-specific channel identifier (a Telegram chat id, ...)
    pub channel_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

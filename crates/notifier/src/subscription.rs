//! Subscription registry: the set of channels that receive notification text.
//!
//! The fan-out path only reads subscriptions through [`SubscriptionRegistry`].
//! Registration and removal go through [`SubscriptionService`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use popebot_common::error::AppError;
use popebot_common::types::Subscription;

/// Read-only view over the current subscribers.
#[async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    /// Every current subscription, in a stable order.
    async fn list_all(&self) -> Result<Vec<Subscription>, AppError>;
}

/// PostgreSQL-backed registry.
#[derive(Clone)]
pub struct PgSubscriptionRegistry {
    pool: PgPool,
}

impl PgSubscriptionRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRegistry for PgSubscriptionRegistry {
    async fn list_all(&self) -> Result<Vec<Subscription>, AppError> {
        SubscriptionService::list_all(&self.pool).await
    }
}

/// Service layer for subscription registration.
pub struct SubscriptionService;

/// Parameters for registering a subscriber channel.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateSubscriptionParams {
    pub platform: String,
    pub channel_id: String,
}

impl SubscriptionService {
    /// Register a channel. Duplicate `(platform, channel_id)` pairs are accepted.
    pub async fn create(
        pool: &PgPool,
        params: &CreateSubscriptionParams,
    ) -> Result<Subscription, AppError> {
        let platform = params.platform.trim();
        let channel_id = params.channel_id.trim();

        if platform.is_empty() {
            return Err(AppError::Validation("platform must not be empty".to_string()));
        }
        if channel_id.is_empty() {
            return Err(AppError::Validation(
                "channel_id must not be empty".to_string(),
            ));
        }

        let sub: Subscription = sqlx::query_as(
            r#"
            INSERT INTO subscriptions (id, platform, channel_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, platform, channel_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(platform)
        .bind(channel_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            subscription_id = %sub.id,
            platform = %sub.platform,
            channel_id = %sub.channel_id,
            "Subscription created"
        );

        Ok(sub)
    }

    /// List all subscriptions, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Subscription>, AppError> {
        let subs: Vec<Subscription> = sqlx::query_as(
            "SELECT id, platform, channel_id, created_at FROM subscriptions ORDER BY created_at, id",
        )
        .fetch_all(pool)
        .await?;

        Ok(subs)
    }

    /// Delete a subscription. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, subscription_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(subscription_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(subscription_id = %subscription_id, "Subscription deleted");
        }

        Ok(deleted)
    }
}

//! Notification log: durable record of notifications with read/unread state.
//!
//! Creating a notification persists it first and only then hands its text to
//! the fan-out queue. The caller never waits on, or sees the result of, delivery.

use sqlx::PgPool;
use uuid::Uuid;

use popebot_common::error::AppError;
use popebot_common::types::Notification;

use crate::queue::{FanoutJob, FanoutQueue};

/// Append-only notification store backed by PostgreSQL.
#[derive(Clone)]
pub struct NotificationLog {
    pool: PgPool,
    fanout: FanoutQueue,
}

impl NotificationLog {
    pub fn new(pool: PgPool, fanout: FanoutQueue) -> Self {
        Self { pool, fanout }
    }

    /// Record a notification and queue it for fan-out.
    ///
    /// Nothing is queued if the insert fails. `created_at` is stamped by the
    /// database in the same statement that assigns `seq`, so timestamps never
    /// decrease in insertion order.
    pub async fn create(
        &self,
        text: &str,
        payload: &serde_json::Value,
    ) -> Result<Notification, AppError> {
        let notification: Notification = sqlx::query_as(
            r#"
            INSERT INTO notifications (id, notification, payload, read, created_at)
            VALUES ($1, $2, $3, false, clock_timestamp())
            RETURNING id, notification, payload, read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(text)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(notification_id = %notification.id, "Notification created");

        let job = FanoutJob {
            notification_id: notification.id,
            text: notification.notification.clone(),
        };
        if let Err(e) = self.fanout.enqueue(job) {
            tracing::warn!(
                notification_id = %notification.id,
                error = %e,
                "Notification stored but not queued for fan-out"
            );
        }

        Ok(notification)
    }

    /// All notifications, newest first. Equal timestamps list the later insert first.
    pub async fn list_all(&self) -> Result<Vec<Notification>, AppError> {
        let notifications: Vec<Notification> = sqlx::query_as(
            r#"
            SELECT id, notification, payload, read, created_at
            FROM notifications
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Number of unread notifications.
    pub async fn count_unread(&self) -> Result<i64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE read = false")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Mark every unread notification as read in one statement.
    ///
    /// Returns the number of rows flipped; zero is not an error.
    pub async fn mark_all_read(&self) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = true WHERE read = false")
            .execute(&self.pool)
            .await?;

        let marked = result.rows_affected();
        if marked > 0 {
            tracing::info!(marked, "Notifications marked read");
        }

        Ok(marked)
    }
}

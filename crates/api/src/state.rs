//! Shared application state for the Axum API server.

use popebot_common::config::AppConfig;
use popebot_notifier::NotificationLog;
use sqlx::PgPool;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub notifications: NotificationLog,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, notifications: NotificationLog) -> Self {
        Self {
            pool,
            config,
            notifications,
        }
    }
}

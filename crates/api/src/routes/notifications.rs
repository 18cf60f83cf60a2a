//! Notification routes: inbound events and the notifications page data.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use popebot_common::error::AppError;
use popebot_common::types::Notification;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", post(create_notification))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/unread-count", get(unread_count))
        .route("/api/notifications/mark-read", post(mark_all_read))
}

/// Request body for recording a notification.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    /// Human-readable text delivered to subscribers
    pub notification: String,
    /// Raw event payload, stored as-is
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// POST /api/notifications: Record an inbound event and fan it out.
async fn create_notification(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<Notification>, AppError> {
    if req.notification.trim().is_empty() {
        return Err(AppError::Validation(
            "notification text must not be empty".to_string(),
        ));
    }

    let notification = state
        .notifications
        .create(&req.notification, &req.payload)
        .await?;
    Ok(Json(notification))
}

/// GET /api/notifications: All notifications, newest first.
async fn list_notifications(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(state.notifications.list_all().await?))
}

/// GET /api/notifications/unread-count
async fn unread_count(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = state.notifications.count_unread().await?;
    Ok(Json(json!({ "count": count })))
}

/// POST /api/notifications/mark-read: Mark every notification read.
async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let marked = state.notifications.mark_all_read().await?;
    tracing::debug!(user_id = %auth.user_id, marked, "Marked notifications read");
    Ok(Json(json!({ "marked": marked })))
}

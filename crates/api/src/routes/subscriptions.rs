//! Subscription registration routes.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use uuid::Uuid;

use popebot_common::error::AppError;
use popebot_common::types::Subscription;
use popebot_notifier::subscription::{CreateSubscriptionParams, SubscriptionService};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/subscriptions", post(create_subscription))
        .route("/api/subscriptions", get(list_subscriptions))
        .route("/api/subscriptions/{id}", delete(delete_subscription))
}

/// POST /api/subscriptions: Register a channel for notification delivery.
async fn create_subscription(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(params): Json<CreateSubscriptionParams>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = SubscriptionService::create(&state.pool, &params).await?;
    Ok(Json(subscription))
}

/// GET /api/subscriptions: List every registered channel.
async fn list_subscriptions(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let subscriptions = SubscriptionService::list_all(&state.pool).await?;
    Ok(Json(subscriptions))
}

/// DELETE /api/subscriptions/:id: Remove a registered channel.
async fn delete_subscription(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = SubscriptionService::delete(&state.pool, id).await?;
    if deleted {
        Ok(Json(serde_json::json!({"deleted": true})))
    } else {
        Err(AppError::NotFound(format!("Subscription {} not found", id)))
    }
}

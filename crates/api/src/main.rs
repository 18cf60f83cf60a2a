//! Popebot API server binary entrypoint.

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use popebot_common::config::AppConfig;
use popebot_common::db::{create_pool, run_migrations};
use popebot_notifier::{
    FanoutDispatcher, FanoutQueue, NotificationLog, PgSubscriptionRegistry, SenderRegistry,
};

use popebot_api::routes::create_router;
use popebot_api::state::AppState;

/// Largest accepted request body (webhook payloads included).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How long pending fan-out jobs may take to drain on shutdown.
const FANOUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("popebot_api=debug,popebot_notifier=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting Popebot API server...");

    // Load and validate configuration
    let config = AppConfig::from_env()?;

    // Database
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    // Fan-out worker
    let dispatcher = FanoutDispatcher::new(
        Arc::new(PgSubscriptionRegistry::new(pool.clone())),
        SenderRegistry::from_config(&config.notifier())?,
    );
    let (fanout, fanout_worker) = FanoutQueue::spawn(dispatcher);

    // Build application state
    let notifications = NotificationLog::new(pool.clone(), fanout);
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config, notifications);

    // Build router
    let app = create_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    // The router (and every queue handle it held) is gone; let the worker drain.
    if tokio::time::timeout(FANOUT_DRAIN_TIMEOUT, fanout_worker)
        .await
        .is_err()
    {
        tracing::warn!("Fan-out worker did not drain before shutdown timeout");
    }

    tracing::info!("Popebot API server stopped.");
    Ok(())
}

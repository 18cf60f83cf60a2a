//! Fan-out queue: hands notifications to a background worker.
//!
//! `NotificationLog::create` enqueues a [`FanoutJob`] and returns immediately.
//! The worker drains the queue in arrival order and runs the dispatcher for each
//! job. Outcomes are visible only in the logs.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use popebot_common::error::AppError;

use crate::dispatcher::FanoutDispatcher;

/// One notification waiting to be fanned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutJob {
    pub notification_id: Uuid,
    pub text: String,
}

/// Producer handle for the fan-out worker.
#[derive(Debug, Clone)]
pub struct FanoutQueue {
    tx: mpsc::UnboundedSender<FanoutJob>,
}

impl FanoutQueue {
    /// Create a queue without a worker. The caller owns the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FanoutJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Create a queue and spawn its worker on the current runtime.
    ///
    /// The worker stops once every `FanoutQueue` clone has been dropped and the
    /// remaining jobs are drained.
    pub fn spawn(dispatcher: FanoutDispatcher) -> (Self, JoinHandle<()>) {
        let (queue, rx) = Self::channel();
        let handle = tokio::spawn(run_worker(dispatcher, rx));
        (queue, handle)
    }

    /// Hand a job to the worker without waiting for it.
    pub fn enqueue(&self, job: FanoutJob) -> Result<(), AppError> {
        self.tx.send(job).map_err(|e| {
            AppError::Queue(format!(
                "fan-out worker is not running, dropped notification {}",
                e.0.notification_id
            ))
        })
    }
}

async fn run_worker(dispatcher: FanoutDispatcher, mut rx: mpsc::UnboundedReceiver<FanoutJob>) {
    tracing::info!("Fan-out worker started");

    while let Some(job) = rx.recv().await {
        match dispatcher.dispatch(&job.text).await {
            Ok(summary) if summary.attempted() == 0 => {
                tracing::debug!(notification_id = %job.notification_id, "Fan-out had no subscribers");
            }
            Ok(summary) => {
                tracing::info!(
                    notification_id = %job.notification_id,
                    delivered = summary.delivered,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Fan-out complete"
                );
            }
            Err(e) => {
                tracing::error!(
                    notification_id = %job.notification_id,
                    error = %e,
                    "Fan-out aborted: could not load subscribers"
                );
            }
        }
    }

    tracing::info!("Fan-out worker stopped");
}

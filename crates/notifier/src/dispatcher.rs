//! Fan-out dispatcher: best-effort delivery of one notification to every subscriber.
//!
//! The subscriber set is read once per notification. Each subscriber is attempted
//! independently: a failed delivery is logged and counted, never retried, and
//! never stops delivery to the rest.

use std::sync::Arc;

use popebot_common::error::AppError;

use crate::sender::{DeliveryOutcome, SenderRegistry};
use crate::subscription::SubscriptionRegistry;

/// Per-notification delivery tally. Only used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl DispatchSummary {
    pub fn attempted(&self) -> u32 {
        self.delivered + self.skipped + self.failed
    }
}

/// Relays notification text to subscriber channels.
#[derive(Clone)]
pub struct FanoutDispatcher {
    registry: Arc<dyn SubscriptionRegistry>,
    senders: SenderRegistry,
}

impl FanoutDispatcher {
    pub fn new(registry: Arc<dyn SubscriptionRegistry>, senders: SenderRegistry) -> Self {
        Self { registry, senders }
    }

    /// Deliver `text` to every current subscriber.
    ///
    /// Only a failure to read the subscriber set is returned as an error.
    pub async fn dispatch(&self, text: &str) -> Result<DispatchSummary, AppError> {
        let subscribers = self.registry.list_all().await?;
        let mut summary = DispatchSummary::default();

        if subscribers.is_empty() {
            tracing::debug!("No subscribers, nothing to fan out");
            return Ok(summary);
        }

        for sub in &subscribers {
            let sender = self.senders.resolve(&sub.platform);

            match sender.send(&sub.channel_id, text).await {
                Ok(DeliveryOutcome::Delivered) => {
                    summary.delivered += 1;
                    tracing::debug!(
                        platform = %sub.platform,
                        channel_id = %sub.channel_id,
                        "Notification delivered"
                    );
                }
                Ok(DeliveryOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        subscription_id = %sub.id,
                        platform = %sub.platform,
                        channel_id = %sub.channel_id,
                        error = %e,
                        "Failed to deliver notification"
                    );
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use popebot_common::config::NotifierConfig;
    use popebot_common::types::Subscription;

    use crate::sender::{ChannelSender, DeliveryError};

    struct StaticRegistry(Vec<Subscription>);

    #[async_trait]
    impl SubscriptionRegistry for StaticRegistry {
        async fn list_all(&self) -> Result<Vec<Subscription>, AppError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRegistry;

    #[async_trait]
    impl SubscriptionRegistry for BrokenRegistry {
        async fn list_all(&self) -> Result<Vec<Subscription>, AppError> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    /// Records every call; fails for channels listed in `failing`.
    #[derive(Default)]
    struct RecordingSender {
        calls: Mutex<Vec<(String, String)>>,
        failing: Vec<String>,
    }

    impl RecordingSender {
        fn failing_on(channels: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: channels.iter().map(|c| c.to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChannelSender for RecordingSender {
        async fn send(&self, channel_id: &str, text: &str) -> Result<DeliveryOutcome, DeliveryError> {
            self.calls
                .lock()
                .unwrap()
                .push((channel_id.to_string(), text.to_string()));

            if self.failing.iter().any(|c| c == channel_id) {
                return Err(DeliveryError::Rejected {
                    status: 403,
                    description: "Forbidden: bot was blocked by the user".to_string(),
                });
            }
            Ok(DeliveryOutcome::Delivered)
        }
    }

    fn sub(platform: &str, channel_id: &str) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            platform: platform.to_string(),
            channel_id: channel_id.to_string(),
            created_at: Utc::now(),
        }
    }

    fn dispatcher(subs: Vec<Subscription>, sender: Arc<RecordingSender>) -> FanoutDispatcher {
        FanoutDispatcher::new(
            Arc::new(StaticRegistry(subs)),
            SenderRegistry::new().with_sender("telegram", sender),
        )
    }

    #[tokio::test]
    async fn test_no_subscribers_is_a_no_op() {
        let sender = Arc::new(RecordingSender::default());
        let summary = dispatcher(vec![], sender.clone()).dispatch("hello").await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delivers_to_every_subscriber() {
        let sender = Arc::new(RecordingSender::default());
        let d = dispatcher(vec![sub("telegram", "A"), sub("telegram", "B")], sender.clone());

        let summary = d.dispatch("hello").await.unwrap();

        assert_eq!(summary.delivered, 2);
        let mut calls = sender.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("A".to_string(), "hello".to_string()),
                ("B".to_string(), "hello".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_deliveries() {
        let sender = Arc::new(RecordingSender::failing_on(&["B"]));
        let d = dispatcher(
            vec![sub("telegram", "A"), sub("telegram", "B"), sub("telegram", "C")],
            sender.clone(),
        );

        let summary = d.dispatch("deploy done").await.unwrap();

        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, 1);
        let channels: Vec<String> = sender.calls().into_iter().map(|(c, _)| c).collect();
        assert_eq!(channels, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_unknown_platform_skipped_silently() {
        let sender = Arc::new(RecordingSender::default());
        let d = dispatcher(vec![sub("smoke-signal", "hill")], sender.clone());

        let summary = d.dispatch("hello").await.unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_skips_telegram_subscribers() {
        let d = FanoutDispatcher::new(
            Arc::new(StaticRegistry(vec![sub("telegram", "A")])),
            SenderRegistry::from_config(&NotifierConfig::default()).unwrap(),
        );

        let summary = d.dispatch("hello").await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.delivered, 0);
    }

    #[tokio::test]
    async fn test_duplicate_subscriptions_receive_duplicate_deliveries() {
        let sender = Arc::new(RecordingSender::default());
        let d = dispatcher(vec![sub("telegram", "A"), sub("telegram", "A")], sender.clone());

        d.dispatch("twice").await.unwrap();
        assert_eq!(sender.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_registry_failure_is_returned() {
        let d = FanoutDispatcher::new(Arc::new(BrokenRegistry), SenderRegistry::new());
        assert!(d.dispatch("hello").await.is_err());
    }
}

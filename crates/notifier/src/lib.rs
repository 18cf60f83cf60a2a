//! Notification log and best-effort fan-out to subscriber channels.

pub mod dispatcher;
pub mod notifications;
pub mod queue;
pub mod sender;
pub mod subscription;

pub use dispatcher::{DispatchSummary, FanoutDispatcher};
pub use notifications::NotificationLog;
pub use queue::{FanoutJob, FanoutQueue};
pub use sender::{ChannelSender, DeliveryError, DeliveryOutcome, SenderRegistry};
pub use subscription::{PgSubscriptionRegistry, SubscriptionRegistry, SubscriptionService};

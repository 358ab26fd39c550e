//! Event source trait for pluggable notification transports.

use std::sync::Arc;

use uuid::Uuid;

use drivelinks_core::types::ShareId;
use drivelinks_entity::EventBatch;

/// Unique subscription identifier.
pub type SubscriptionId = Uuid;

/// Callback receiving every batch published for a subscribed share.
pub type EventHandler = Arc<dyn Fn(&ShareId, &EventBatch) + Send + Sync>;

/// A transport delivering ordered event batches per share.
///
/// Batches for one share reach each of its handlers in publish order.
/// The subscriber owns the subscription lifetime and must unsubscribe
/// when it no longer wants events.
pub trait EventSource: Send + Sync + std::fmt::Debug + 'static {
    /// Register `handler` for batches of `share_id`.
    fn subscribe(&self, share_id: &ShareId, handler: EventHandler) -> SubscriptionId;

    /// Remove a subscription. Returns `false` if it was not registered.
    fn unsubscribe(&self, subscription_id: SubscriptionId) -> bool;
}

//! In-process event source for single-node deployments and tests.

use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use drivelinks_core::types::ShareId;
use drivelinks_entity::EventBatch;

use crate::source::{EventHandler, EventSource, SubscriptionId};
use crate::subscription::SubscriptionTracker;

/// Registry of per-share event handlers.
#[derive(Default)]
pub struct MemoryEventSource {
    /// Share ID → handlers in registration order.
    handlers: DashMap<ShareId, Vec<(SubscriptionId, EventHandler)>>,
    /// Subscription tracker (reverse index).
    subscriptions: SubscriptionTracker,
}

impl std::fmt::Debug for MemoryEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventSource")
            .field("shares", &self.handlers.len())
            .field("subscriptions", &self.subscriptions.count())
            .finish()
    }
}

impl MemoryEventSource {
    /// Creates an empty event source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a batch to every handler of `share_id`, in registration
    /// order. Returns the number of handlers invoked.
    ///
    /// Handlers run outside the registry lock, so they may subscribe or
    /// unsubscribe.
    pub fn publish(&self, share_id: &ShareId, batch: &EventBatch) -> usize {
        let handlers: Vec<EventHandler> = self
            .handlers
            .get(share_id)
            .map(|entry| entry.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(share_id, batch);
        }
        debug!(share_id = %share_id, events = batch.len(), handlers = handlers.len(), "Published batch");
        handlers.len()
    }

    /// Returns the subscriber count for a share.
    pub fn subscriber_count(&self, share_id: &ShareId) -> usize {
        self.handlers
            .get(share_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Returns the number of live subscriptions across all shares.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.count()
    }
}

impl EventSource for MemoryEventSource {
    fn subscribe(&self, share_id: &ShareId, handler: EventHandler) -> SubscriptionId {
        let subscription_id = Uuid::new_v4();
        self.handlers
            .entry(share_id.clone())
            .or_default()
            .push((subscription_id, handler));
        self.subscriptions.add(subscription_id, share_id.clone());
        info!(share_id = %share_id, %subscription_id, "Subscribed to share events");
        subscription_id
    }

    fn unsubscribe(&self, subscription_id: SubscriptionId) -> bool {
        let Some(share_id) = self.subscriptions.remove(subscription_id) else {
            return false;
        };
        if let Some(mut entry) = self.handlers.get_mut(&share_id) {
            entry.retain(|(id, _)| *id != subscription_id);
        }
        self.handlers
            .remove_if(&share_id, |_, handlers| handlers.is_empty());
        info!(share_id = %share_id, %subscription_id, "Unsubscribed from share events");
        true
    }
}

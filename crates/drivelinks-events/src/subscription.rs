//! Subscription tracking: which share each subscription listens to.

use dashmap::DashMap;

use drivelinks_core::types::ShareId;

use crate::source::SubscriptionId;

/// Reverse index from subscription to share.
#[derive(Debug)]
pub struct SubscriptionTracker {
    /// Subscription ID → share ID.
    sub_to_share: DashMap<SubscriptionId, ShareId>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self {
            sub_to_share: DashMap::new(),
        }
    }

    /// Records a subscription.
    pub fn add(&self, subscription_id: SubscriptionId, share_id: ShareId) {
        self.sub_to_share.insert(subscription_id, share_id);
    }

    /// Removes a subscription, returning the share it listened to.
    pub fn remove(&self, subscription_id: SubscriptionId) -> Option<ShareId> {
        self.sub_to_share
            .remove(&subscription_id)
            .map(|(_, share_id)| share_id)
    }

    /// Returns the number of live subscriptions.
    pub fn count(&self) -> usize {
        self.sub_to_share.len()
    }
}

impl Default for SubscriptionTracker {
    fn default() -> Self {
        Self::new()
    }
}

//! Event source → link cache wiring.
//!
//! A [`CacheSubscription`] ties one share's event stream to a cache for
//! as long as the handle lives.

use std::sync::Arc;

use tracing::debug;

use drivelinks_cache::LinksCache;
use drivelinks_core::types::ShareId;
use drivelinks_entity::EventBatch;

use crate::source::{EventSource, SubscriptionId};

/// Live subscription applying a share's events to a cache.
///
/// Unsubscribes when dropped.
#[derive(Debug)]
pub struct CacheSubscription {
    /// Source the subscription is registered with.
    source: Arc<dyn EventSource>,
    /// Subscription ID.
    id: SubscriptionId,
    /// Share whose events are applied.
    share_id: ShareId,
    /// Cleared once unsubscribed.
    active: bool,
}

/// Subscribe `cache` to `share_id` events from `source`.
///
/// Batches arriving before the share is populated in the cache are
/// dropped by the cache.
pub fn attach_cache(
    source: Arc<dyn EventSource>,
    cache: LinksCache,
    share_id: ShareId,
) -> CacheSubscription {
    let handler = Arc::new(move |share_id: &ShareId, batch: &EventBatch| {
        let applied = cache.apply_batch(share_id, batch);
        debug!(share_id = %share_id, applied, "Handled event batch");
    });
    let id = source.subscribe(&share_id, handler);
    CacheSubscription {
        source,
        id,
        share_id,
        active: true,
    }
}

impl CacheSubscription {
    /// The subscription ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The subscribed share.
    pub fn share_id(&self) -> &ShareId {
        &self.share_id
    }

    /// Unsubscribe now. Returns whether the source still knew the
    /// subscription.
    pub fn detach(mut self) -> bool {
        self.unsubscribe()
    }

    fn unsubscribe(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.source.unsubscribe(self.id)
    }
}

impl Drop for CacheSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

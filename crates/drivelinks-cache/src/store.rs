//! In-memory link cache shared by every view of a session.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use drivelinks_core::config::cache::{DeleteMode, LinkCacheConfig};
use drivelinks_core::types::{LinkId, ShareId};
use drivelinks_entity::{EventBatch, Link, LinkEvent};

use crate::sameness::{EncryptedContentSameness, LinkSameness};
use crate::state::{ShareState, ShareStats};

/// One share's current state plus the lock that serializes its writers.
#[derive(Debug, Default)]
struct ShareSlot {
    /// Held for the whole of a mutation.
    writer: Mutex<()>,
    /// Latest committed state.
    current: RwLock<Arc<ShareState>>,
}

impl ShareSlot {
    fn snapshot(&self) -> Arc<ShareState> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Runs `f` against a private copy of the state and publishes the
    /// copy afterwards. Writers on the same share queue on `writer`.
    fn mutate<R>(&self, f: impl FnOnce(&mut ShareState) -> R) -> R {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = ShareState::clone(&self.snapshot());
        let result = f(&mut next);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(next);
        result
    }
}

/// Link metadata cache for every share of a session.
///
/// Reads never fail: a missing share or link reads as empty. Mutations
/// against a share that was never populated through
/// [`set_links`](Self::set_links) are ignored.
#[derive(Debug, Clone)]
pub struct LinksCache {
    /// Share ID → share slot.
    shares: Arc<DashMap<ShareId, Arc<ShareSlot>>>,
    /// Decides whether an updated record invalidates a projection.
    sameness: Arc<dyn LinkSameness>,
    /// Reach of link deletion.
    delete_mode: DeleteMode,
}

impl LinksCache {
    /// Create an empty cache using [`EncryptedContentSameness`].
    pub fn new(config: &LinkCacheConfig) -> Self {
        Self::with_sameness(config, Arc::new(EncryptedContentSameness))
    }

    /// Create an empty cache with a custom sameness predicate.
    pub fn with_sameness(config: &LinkCacheConfig, sameness: Arc<dyn LinkSameness>) -> Self {
        Self {
            shares: Arc::new(DashMap::new()),
            sameness,
            delete_mode: config.delete_mode,
        }
    }

    /// The configured delete mode.
    pub fn delete_mode(&self) -> DeleteMode {
        self.delete_mode
    }

    fn slot(&self, share_id: &ShareId) -> Option<Arc<ShareSlot>> {
        self.shares.get(share_id).map(|slot| Arc::clone(slot.value()))
    }

    fn slot_or_create(&self, share_id: &ShareId) -> Arc<ShareSlot> {
        Arc::clone(
            self.shares
                .entry(share_id.clone())
                .or_insert_with(|| {
                    debug!(share_id = %share_id, "Creating share state");
                    Arc::new(ShareSlot::default())
                })
                .value(),
        )
    }

    // ── Reads ──────────────────────────────────────────────

    /// Immutable snapshot of a share's state.
    pub fn snapshot(&self, share_id: &ShareId) -> Option<Arc<ShareState>> {
        self.slot(share_id).map(|slot| slot.snapshot())
    }

    /// Whether the share has been populated.
    pub fn has_share(&self, share_id: &ShareId) -> bool {
        self.shares.contains_key(share_id)
    }

    /// IDs of every populated share.
    pub fn share_ids(&self) -> Vec<ShareId> {
        let mut ids: Vec<ShareId> = self.shares.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Get a link.
    pub fn get_link(&self, share_id: &ShareId, link_id: &LinkId) -> Option<Arc<Link>> {
        self.snapshot(share_id)
            .and_then(|state| state.link(link_id).cloned())
    }

    /// Non-trashed children of a folder, in tree order.
    pub fn get_children(&self, share_id: &ShareId, parent_link_id: &LinkId) -> Vec<Arc<Link>> {
        self.snapshot(share_id)
            .map(|state| state.children(parent_link_id))
            .unwrap_or_default()
    }

    /// Every trashed link of the share.
    pub fn get_trashed(&self, share_id: &ShareId) -> Vec<Arc<Link>> {
        self.snapshot(share_id)
            .map(|state| state.trashed())
            .unwrap_or_default()
    }

    /// Every non-trashed link of the share with a public share URL.
    pub fn get_shared_by_link(&self, share_id: &ShareId) -> Vec<Arc<Link>> {
        self.snapshot(share_id)
            .map(|state| state.shared_by_link())
            .unwrap_or_default()
    }

    /// Every cached link of the share.
    pub fn get_all_links(&self, share_id: &ShareId) -> Vec<Arc<Link>> {
        self.snapshot(share_id)
            .map(|state| state.all_links())
            .unwrap_or_default()
    }

    /// Counters for a share.
    pub fn stats(&self, share_id: &ShareId) -> Option<ShareStats> {
        self.snapshot(share_id).map(|state| state.stats())
    }

    // ── Mutations ──────────────────────────────────────────

    /// Insert or merge a batch of links, creating the share on first use.
    pub fn set_links(&self, share_id: &ShareId, links: Vec<Link>) {
        if links.is_empty() {
            return;
        }
        let count = links.len();
        let sameness = self.sameness.as_ref();
        self.slot_or_create(share_id).mutate(|state| {
            for link in links {
                state.upsert(link, sameness);
            }
        });
        debug!(share_id = %share_id, count, "Set links");
    }

    /// Lock the listed links that have a decrypted projection.
    pub fn lock_links(&self, share_id: &ShareId, link_ids: &[LinkId]) {
        self.set_lock(share_id, link_ids, true);
    }

    /// Unlock the listed links that have a decrypted projection.
    pub fn unlock_links(&self, share_id: &ShareId, link_ids: &[LinkId]) {
        self.set_lock(share_id, link_ids, false);
    }

    fn set_lock(&self, share_id: &ShareId, link_ids: &[LinkId], is_locked: bool) {
        let Some(slot) = self.slot(share_id) else {
            return;
        };
        let changed = slot.mutate(|state| state.set_lock(link_ids, is_locked));
        debug!(share_id = %share_id, is_locked, changed, "Set link lock");
    }

    /// Freeze the trash view as it is being emptied.
    pub fn lock_trash(&self, share_id: &ShareId) {
        self.lock_trash_at(share_id, Utc::now());
    }

    /// Freeze the trash view, recording `emptied_at` as the trash epoch.
    ///
    /// Trashed links that arrive later with an older trash timestamp are
    /// locked on arrival.
    pub fn lock_trash_at(&self, share_id: &ShareId, emptied_at: DateTime<Utc>) {
        let Some(slot) = self.slot(share_id) else {
            return;
        };
        let locked = slot.mutate(|state| state.lock_trash(emptied_at));
        debug!(share_id = %share_id, %emptied_at, locked, "Locked trash");
    }

    /// Attach a locally rendered thumbnail to a decrypted link.
    pub fn set_cached_thumbnail(&self, share_id: &ShareId, link_id: &LinkId, url: impl Into<String>) {
        let Some(slot) = self.slot(share_id) else {
            return;
        };
        let url = url.into();
        let set = slot.mutate(|state| state.set_cached_thumbnail(link_id, url));
        debug!(share_id = %share_id, link_id = %link_id, set, "Set cached thumbnail");
    }

    /// Delete links with their descendants per the configured
    /// [`DeleteMode`]. Returns whether anything was removed.
    pub fn delete_links(&self, share_id: &ShareId, link_ids: &[LinkId]) -> bool {
        let Some(slot) = self.slot(share_id) else {
            return false;
        };
        let mode = self.delete_mode;
        let removed = slot.mutate(|state| state.delete_links(link_ids, mode));
        debug!(share_id = %share_id, %mode, removed, "Deleted links");
        removed > 0
    }

    /// Apply change notifications in order.
    ///
    /// Deletes remove the link; every other event type upserts the
    /// encrypted record. The whole slice is applied as one mutation.
    /// Returns `false` if the share has not been populated yet.
    pub fn apply_events(&self, share_id: &ShareId, events: &[LinkEvent]) -> bool {
        let Some(slot) = self.slot(share_id) else {
            warn!(share_id = %share_id, count = events.len(), "Dropping events for unknown share");
            return false;
        };
        if events.is_empty() {
            return true;
        }
        let mode = self.delete_mode;
        let sameness = self.sameness.as_ref();
        slot.mutate(|state| {
            for event in events {
                if event.is_delete() {
                    state.delete_links(std::slice::from_ref(&event.encrypted_link.link_id), mode);
                } else {
                    state.upsert(Link::encrypted(event.encrypted_link.clone()), sameness);
                }
            }
        });
        debug!(share_id = %share_id, count = events.len(), "Applied events");
        true
    }

    /// Apply an event batch. See [`apply_events`](Self::apply_events).
    pub fn apply_batch(&self, share_id: &ShareId, batch: &EventBatch) -> bool {
        let applied = self.apply_events(share_id, &batch.events);
        if applied {
            if let Some(event_id) = &batch.event_id {
                debug!(share_id = %share_id, event_id, "Reached event cursor");
            }
        }
        applied
    }
}

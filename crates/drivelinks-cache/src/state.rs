//! Cached state of a single share.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use drivelinks_core::config::cache::DeleteMode;
use drivelinks_core::types::LinkId;
use drivelinks_entity::Link;

use crate::merge;
use crate::sameness::LinkSameness;

/// Links, child tree and trash epoch of one share.
///
/// Readers get immutable snapshots of this value from
/// [`LinksCache::snapshot`](crate::LinksCache::snapshot). Links are held
/// behind `Arc` so cloning a state for the next mutation only copies
/// pointers.
#[derive(Debug, Clone, Default)]
pub struct ShareState {
    /// Link ID → link.
    links: HashMap<LinkId, Arc<Link>>,
    /// Parent link ID → non-trashed children, in insertion order.
    tree: HashMap<LinkId, Vec<LinkId>>,
    /// When the trash was last emptied.
    latest_trash_emptied_at: Option<DateTime<Utc>>,
}

/// Counters describing a share's cached links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShareStats {
    /// Cached links.
    pub links: usize,
    /// Links with a decrypted projection.
    pub decrypted: usize,
    /// Projections flagged stale.
    pub stale: usize,
    /// Projections flagged locked.
    pub locked: usize,
    /// Links whose encrypted record is trashed.
    pub trashed: usize,
}

impl ShareState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a link by ID.
    pub fn link(&self, link_id: &LinkId) -> Option<&Arc<Link>> {
        self.links.get(link_id)
    }

    /// Whether a link is cached.
    pub fn contains(&self, link_id: &LinkId) -> bool {
        self.links.contains_key(link_id)
    }

    /// Number of cached links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no link is cached.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// IDs registered as non-trashed children of `parent_link_id`.
    pub fn child_ids(&self, parent_link_id: &LinkId) -> &[LinkId] {
        self.tree
            .get(parent_link_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Children of `parent_link_id`, in tree order.
    ///
    /// IDs without a cached link are skipped.
    pub fn children(&self, parent_link_id: &LinkId) -> Vec<Arc<Link>> {
        self.child_ids(parent_link_id)
            .iter()
            .filter_map(|id| self.links.get(id).cloned())
            .collect()
    }

    /// All cached links, ordered by link ID.
    pub fn all_links(&self) -> Vec<Arc<Link>> {
        let mut links: Vec<Arc<Link>> = self.links.values().cloned().collect();
        links.sort_by(|a, b| a.link_id().cmp(b.link_id()));
        links
    }

    /// Links whose encrypted record is trashed.
    pub fn trashed(&self) -> Vec<Arc<Link>> {
        self.filtered(|link| link.is_trashed())
    }

    /// Non-trashed links carrying a public share URL.
    pub fn shared_by_link(&self) -> Vec<Arc<Link>> {
        self.filtered(|link| !link.is_trashed() && link.encrypted.share_url.is_some())
    }

    /// When the trash was last emptied.
    pub fn latest_trash_emptied_at(&self) -> Option<DateTime<Utc>> {
        self.latest_trash_emptied_at
    }

    /// Counters for diagnostics.
    pub fn stats(&self) -> ShareStats {
        let mut stats = ShareStats {
            links: self.links.len(),
            ..ShareStats::default()
        };
        for link in self.links.values() {
            if link.is_trashed() {
                stats.trashed += 1;
            }
            if let Some(decrypted) = &link.decrypted {
                stats.decrypted += 1;
                stats.stale += usize::from(decrypted.is_stale);
                stats.locked += usize::from(decrypted.is_locked);
            }
        }
        stats
    }

    fn filtered(&self, predicate: impl Fn(&Link) -> bool) -> Vec<Arc<Link>> {
        self.all_links()
            .into_iter()
            .filter(|link| predicate(link))
            .collect()
    }

    /// Insert or merge `incoming` and update its tree registration.
    pub(crate) fn upsert(&mut self, incoming: Link, sameness: &dyn LinkSameness) {
        let link_id = incoming.encrypted.link_id.clone();
        let parent_link_id = incoming.encrypted.parent_link_id.clone();
        let trashed = incoming.is_trashed();

        match self.links.get_mut(&link_id) {
            Some(original) => {
                if original.encrypted.parent_link_id != parent_link_id {
                    if let Some(previous_parent) = &original.encrypted.parent_link_id {
                        detach(&mut self.tree, previous_parent, &link_id);
                    }
                }
                let decrypted = merge::next_decrypted(original, &incoming, sameness);
                let link = Arc::make_mut(original);
                link.encrypted = incoming.encrypted;
                link.decrypted = decrypted;
                trace!(link_id = %link_id, "Merged link");
            }
            None => {
                self.links.insert(link_id.clone(), Arc::new(incoming));
                trace!(link_id = %link_id, "Inserted link");
            }
        }

        self.lock_if_trash_emptied(&link_id);

        if let Some(parent_link_id) = parent_link_id {
            if trashed {
                detach(&mut self.tree, &parent_link_id, &link_id);
            } else {
                attach(&mut self.tree, parent_link_id, link_id);
            }
        }
    }

    /// Trashed links that predate the last trash emptying arrived from a
    /// listing page fetched before the server finished; freeze them too.
    fn lock_if_trash_emptied(&mut self, link_id: &LinkId) {
        let Some(emptied_at) = self.latest_trash_emptied_at else {
            return;
        };
        let Some(link) = self.links.get_mut(link_id) else {
            return;
        };
        let needs_lock = link.decrypted.as_ref().is_some_and(|decrypted| {
            !decrypted.is_locked && decrypted.trashed.is_some_and(|trashed| trashed < emptied_at)
        });
        if needs_lock {
            if let Some(decrypted) = Arc::make_mut(link).decrypted.as_mut() {
                decrypted.is_locked = true;
            }
        }
    }

    /// Set the lock flag on every listed link with a projection.
    pub(crate) fn set_lock(&mut self, link_ids: &[LinkId], is_locked: bool) -> usize {
        let mut changed = 0;
        for link_id in link_ids {
            let Some(link) = self.links.get_mut(link_id) else {
                continue;
            };
            if link.decrypted.is_none() {
                continue;
            }
            if let Some(decrypted) = Arc::make_mut(link).decrypted.as_mut() {
                decrypted.is_locked = is_locked;
                changed += 1;
            }
        }
        changed
    }

    /// Record the trash epoch and lock every decrypted trashed link.
    pub(crate) fn lock_trash(&mut self, emptied_at: DateTime<Utc>) -> usize {
        self.latest_trash_emptied_at = Some(emptied_at);
        let mut locked = 0;
        for link in self.links.values_mut() {
            let in_trash = link
                .decrypted
                .as_ref()
                .is_some_and(|decrypted| decrypted.trashed.is_some());
            if !in_trash {
                continue;
            }
            if let Some(decrypted) = Arc::make_mut(link).decrypted.as_mut() {
                decrypted.is_locked = true;
                locked += 1;
            }
        }
        locked
    }

    /// Attach a thumbnail URL to a decrypted link.
    pub(crate) fn set_cached_thumbnail(&mut self, link_id: &LinkId, url: String) -> bool {
        let Some(link) = self.links.get_mut(link_id) else {
            return false;
        };
        if link.decrypted.is_none() {
            return false;
        }
        match Arc::make_mut(link).decrypted.as_mut() {
            Some(decrypted) => {
                decrypted.cached_thumbnail_url = Some(url);
                true
            }
            None => false,
        }
    }

    /// Delete links and their descendants per `mode`.
    ///
    /// Returns the number of links removed from the table.
    pub(crate) fn delete_links(&mut self, link_ids: &[LinkId], mode: DeleteMode) -> usize {
        let mut removed = 0;
        for link_id in link_ids {
            let Some(original) = self.links.remove(link_id) else {
                continue;
            };
            removed += 1;
            if let Some(parent_link_id) = original.parent_link_id() {
                detach(&mut self.tree, parent_link_id, link_id);
            }

            removed += match mode {
                DeleteMode::Shallow => self.remove_direct_children(link_id),
                DeleteMode::Recursive => self.remove_descendants(link_id),
            };
        }
        removed
    }

    /// Drops the children listed in the link's tree entry, then the entry.
    /// Their own tree entries and descendants are left as they are.
    fn remove_direct_children(&mut self, link_id: &LinkId) -> usize {
        let Some(children) = self.tree.remove(link_id) else {
            return 0;
        };
        children
            .iter()
            .filter(|child| self.links.remove(*child).is_some())
            .count()
    }

    /// Drops every cached link whose ancestry leads to `link_id`,
    /// trashed ones included, along with their tree entries.
    fn remove_descendants(&mut self, link_id: &LinkId) -> usize {
        let mut by_parent: HashMap<&LinkId, Vec<&LinkId>> = HashMap::new();
        for link in self.links.values() {
            if let Some(parent) = link.parent_link_id() {
                by_parent.entry(parent).or_default().push(link.link_id());
            }
        }

        let mut doomed: HashSet<LinkId> = HashSet::new();
        let mut pending: Vec<&LinkId> = vec![link_id];
        while let Some(current) = pending.pop() {
            for child in by_parent.get(current).into_iter().flatten() {
                if doomed.insert((*child).clone()) {
                    pending.push(*child);
                }
            }
        }

        self.tree.remove(link_id);
        for id in &doomed {
            self.links.remove(id);
            self.tree.remove(id);
        }
        doomed.len()
    }
}

fn attach(tree: &mut HashMap<LinkId, Vec<LinkId>>, parent_link_id: LinkId, link_id: LinkId) {
    let children = tree.entry(parent_link_id).or_default();
    if !children.contains(&link_id) {
        children.push(link_id);
    }
}

fn detach(tree: &mut HashMap<LinkId, Vec<LinkId>>, parent_link_id: &LinkId, link_id: &LinkId) {
    if let Some(children) = tree.get_mut(parent_link_id) {
        children.retain(|child| child != link_id);
    }
}

//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use drivelinks_cache::LinksCache;
use drivelinks_core::config::cache::{DeleteMode, LinkCacheConfig};
use drivelinks_core::types::{LinkId, ShareId};
use drivelinks_entity::{DecryptedLink, EncryptedLink, Link};

/// A cache with one share under test.
pub struct TestShare {
    pub cache: LinksCache,
    pub share_id: ShareId,
}

impl TestShare {
    /// Default configuration (recursive deletes).
    pub fn new() -> Self {
        Self::with_delete_mode(DeleteMode::Recursive)
    }

    pub fn with_delete_mode(delete_mode: DeleteMode) -> Self {
        Self {
            cache: LinksCache::new(&LinkCacheConfig { delete_mode }),
            share_id: ShareId::from("share-under-test"),
        }
    }

    /// Populate the share with a root folder and `links`.
    pub fn seeded(links: Vec<Link>) -> Self {
        let share = Self::new();
        share.set(vec![Link::encrypted(EncryptedLink::folder("root", None))]);
        share.set(links);
        share
    }

    pub fn set(&self, links: Vec<Link>) {
        self.cache.set_links(&self.share_id, links);
    }

    pub fn link(&self, link_id: &str) -> Arc<Link> {
        self.cache
            .get_link(&self.share_id, &id(link_id))
            .unwrap_or_else(|| panic!("link {link_id} not cached"))
    }

    pub fn decrypted(&self, link_id: &str) -> DecryptedLink {
        self.link(link_id)
            .decrypted
            .clone()
            .unwrap_or_else(|| panic!("link {link_id} has no projection"))
    }

    pub fn contains(&self, link_id: &str) -> bool {
        self.cache.get_link(&self.share_id, &id(link_id)).is_some()
    }

    pub fn child_ids(&self, parent: &str) -> Vec<String> {
        self.cache
            .get_children(&self.share_id, &id(parent))
            .iter()
            .map(|link| link.link_id().to_string())
            .collect()
    }

    /// Every non-trashed link with a parent is registered under it, and
    /// every registered child is cached and not trashed.
    pub fn assert_tree_consistent(&self) {
        let state = self
            .cache
            .snapshot(&self.share_id)
            .expect("share is cached");
        for link in state.all_links() {
            if let Some(parent) = link.parent_link_id() {
                let registered = state.child_ids(parent).contains(link.link_id());
                assert_eq!(
                    registered,
                    !link.is_trashed(),
                    "tree registration of {} under {}",
                    link.link_id(),
                    parent
                );
            }
            for child in state.child_ids(link.link_id()) {
                let child = state.link(child).expect("tree child is cached");
                assert!(!child.is_trashed(), "trashed child {} in tree", child.link_id());
            }
        }
    }
}

pub fn id(s: &str) -> LinkId {
    LinkId::from(s)
}

/// Fixed reference instant offset by `seconds`.
pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
}

pub fn folder(link_id: &str, parent: &str) -> EncryptedLink {
    EncryptedLink::folder(link_id, Some(id(parent)))
}

pub fn file(link_id: &str, parent: &str, revision: &str) -> EncryptedLink {
    EncryptedLink::file(link_id, Some(id(parent)), revision)
}

/// Wrap a record with a projection named after the link.
pub fn decrypted(encrypted: EncryptedLink) -> Link {
    let name = format!("{}.name", encrypted.link_id);
    let projection = DecryptedLink::from_encrypted(&encrypted, name, at(0));
    Link::decrypted(encrypted, projection)
}

pub fn encrypted_only(encrypted: EncryptedLink) -> Link {
    Link::encrypted(encrypted)
}

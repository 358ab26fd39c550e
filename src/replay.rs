//! Fixture replay against a fresh cache.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use drivelinks_cache::{LinksCache, ShareState, ShareStats};
use drivelinks_core::config::AppConfig;
use drivelinks_core::error::AppError;
use drivelinks_core::result::AppResult;
use drivelinks_core::types::{LinkId, ShareId};
use drivelinks_entity::Link;
use drivelinks_events::{MemoryEventSource, ShareEventQueue, attach_cache};

use crate::fixture::Fixture;

/// How event batches reach the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Published on an in-memory source the cache is subscribed to.
    Subscribed,
    /// Enqueued on a per-share apply queue.
    Queued,
}

/// One row of the printed children tree.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TreeRow {
    /// Indented link ID.
    #[tabled(rename = "Link")]
    pub link: String,
    /// Folder or file.
    #[tabled(rename = "Kind")]
    pub kind: String,
    /// Decrypted name, `-` when not decrypted yet.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Locked by a trash emptying or an explicit lock.
    #[tabled(rename = "Locked")]
    pub locked: bool,
    /// Decrypted projection is out of date.
    #[tabled(rename = "Stale")]
    pub stale: bool,
    /// Share URL access count, `-` when unknown or not shared.
    #[tabled(rename = "Accesses")]
    pub accesses: String,
}

/// Result of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Replayed share.
    pub share_id: ShareId,
    /// Batches the cache accepted.
    pub batches_applied: u64,
    /// Children tree under the fixture root, depth first.
    pub tree: Vec<TreeRow>,
    /// IDs of trashed links.
    pub trashed: Vec<LinkId>,
    /// IDs of links with a share URL.
    pub shared_by_link: Vec<LinkId>,
    /// Share counters.
    pub stats: ShareStats,
}

/// Feed `fixture` through a new cache built from `config`.
pub async fn replay(
    config: &AppConfig,
    fixture: Fixture,
    delivery: Delivery,
) -> AppResult<ReplayReport> {
    let cache = LinksCache::new(&config.cache);
    let Fixture {
        share_id,
        root_link_id,
        listing,
        lock_trash,
        late_listing,
        batches,
    } = fixture;

    // ── Step 1: Listings and trash emptying ──
    cache.set_links(&share_id, listing);
    if lock_trash {
        cache.lock_trash(&share_id);
    }
    cache.set_links(&share_id, late_listing);

    // ── Step 2: Events ──
    let batches_applied = match delivery {
        Delivery::Subscribed => {
            let source = Arc::new(MemoryEventSource::new());
            let subscription = attach_cache(source.clone(), cache.clone(), share_id.clone());
            let mut delivered = 0u64;
            for batch in &batches {
                if source.publish(&share_id, batch) > 0 {
                    delivered += 1;
                }
            }
            subscription.detach();
            delivered
        }
        Delivery::Queued => {
            let queue = ShareEventQueue::spawn(cache.clone(), share_id.clone(), &config.events);
            for batch in batches {
                queue.enqueue(batch).await?;
            }
            queue.shutdown().await?
        }
    };

    // ── Step 3: Report ──
    let snapshot = cache
        .snapshot(&share_id)
        .ok_or_else(|| AppError::not_found(format!("Share {share_id} is not cached")))?;

    let mut tree = Vec::new();
    if let Some(root) = snapshot.link(&root_link_id) {
        let mut visited = HashSet::from([root_link_id.clone()]);
        tree.push(tree_row(root, 0));
        walk_children(&snapshot, &root_link_id, 1, &mut visited, &mut tree);
    }

    let report = ReplayReport {
        share_id,
        batches_applied,
        tree,
        trashed: ids(snapshot.trashed()),
        shared_by_link: ids(snapshot.shared_by_link()),
        stats: snapshot.stats(),
    };
    info!(
        share_id = %report.share_id,
        links = report.stats.links,
        batches = report.batches_applied,
        "Replay complete"
    );
    Ok(report)
}

/// Depth-first walk. Each link is emitted once; events can move a folder
/// under its own descendant, so the tree may contain cycles.
fn walk_children(
    state: &ShareState,
    parent: &LinkId,
    depth: usize,
    visited: &mut HashSet<LinkId>,
    rows: &mut Vec<TreeRow>,
) {
    for child in state.children(parent) {
        if !visited.insert(child.link_id().clone()) {
            continue;
        }
        rows.push(tree_row(&child, depth));
        walk_children(state, child.link_id(), depth + 1, visited, rows);
    }
}

fn tree_row(link: &Link, depth: usize) -> TreeRow {
    let decrypted = link.decrypted.as_ref();
    let accesses = decrypted
        .and_then(|d| d.share_url.as_ref())
        .or(link.encrypted.share_url.as_ref())
        .and_then(|url| url.num_accesses.value())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());

    TreeRow {
        link: format!("{}{}", "  ".repeat(depth), link.link_id()),
        kind: if link.encrypted.is_file() {
            "file".to_string()
        } else {
            "folder".to_string()
        },
        name: decrypted
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "-".to_string()),
        locked: decrypted.is_some_and(|d| d.is_locked),
        stale: decrypted.is_some_and(|d| d.is_stale),
        accesses,
    }
}

fn ids(links: Vec<Arc<Link>>) -> Vec<LinkId> {
    links.iter().map(|l| l.link_id().clone()).collect()
}

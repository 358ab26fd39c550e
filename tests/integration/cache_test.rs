//! Integration tests for the link cache merge, tree and lock rules.

mod helpers;

use drivelinks_core::config::cache::DeleteMode;
use drivelinks_entity::{EncryptedLink, EventType, LinkEvent, NumAccesses, ShareUrl};

use helpers::{TestShare, at, decrypted, encrypted_only, file, folder, id};

fn shared(link: EncryptedLink, accesses: NumAccesses) -> EncryptedLink {
    link.with_share_url(Some(ShareUrl::new("url-1", "token").with_num_accesses(accesses)))
}

// ── Merge ──────────────────────────────────────────────────

#[test]
fn test_reapplying_same_record_keeps_fresh_projection() {
    let share = TestShare::seeded(vec![decrypted(file("f1", "root", "rev-1"))]);
    let before = share.decrypted("f1");

    share.set(vec![encrypted_only(file("f1", "root", "rev-1"))]);
    share.set(vec![encrypted_only(file("f1", "root", "rev-1"))]);

    let after = share.decrypted("f1");
    assert!(!after.is_stale);
    assert_eq!(after, before);
    share.assert_tree_consistent();
}

#[test]
fn test_changed_record_marks_projection_stale() {
    let share = TestShare::seeded(vec![decrypted(file("f1", "root", "rev-1"))]);

    let mut renamed = file("f1", "root", "rev-1");
    renamed.name = "enc:renamed".to_string();
    renamed.hash = "new-hash".to_string();
    share.set(vec![encrypted_only(renamed)]);

    let projection = share.decrypted("f1");
    assert!(projection.is_stale);
    assert_eq!(projection.name, "f1.name");
    assert_eq!(share.link("f1").encrypted.name, "enc:renamed");

    // A fresh decryption replaces the stale projection.
    let mut redecrypted = file("f1", "root", "rev-1");
    redecrypted.name = "enc:renamed".to_string();
    redecrypted.hash = "new-hash".to_string();
    share.set(vec![decrypted(redecrypted)]);
    assert!(!share.decrypted("f1").is_stale);
}

#[test]
fn test_encrypted_only_link_stays_without_projection() {
    let share = TestShare::seeded(vec![encrypted_only(folder("a", "root"))]);
    share.set(vec![encrypted_only(folder("a", "root"))]);
    assert!(share.link("a").decrypted.is_none());
}

#[test]
fn test_lock_survives_updates() {
    let share = TestShare::seeded(vec![decrypted(file("f1", "root", "rev-1"))]);
    share.cache.lock_links(&share.share_id, &[id("f1")]);

    share.set(vec![encrypted_only(file("f1", "root", "rev-2"))]);
    assert!(share.decrypted("f1").is_locked);

    share.set(vec![decrypted(file("f1", "root", "rev-2"))]);
    assert!(share.decrypted("f1").is_locked);

    share.cache.unlock_links(&share.share_id, &[id("f1")]);
    assert!(!share.decrypted("f1").is_locked);
}

// ── Access counter ─────────────────────────────────────────

#[test]
fn test_unknown_counter_reuses_cached_value() {
    let share = TestShare::seeded(vec![decrypted(shared(
        file("f1", "root", "rev-1"),
        NumAccesses::Known(5),
    ))]);

    share.set(vec![encrypted_only(shared(
        file("f1", "root", "rev-1"),
        NumAccesses::Unknown,
    ))]);

    let url = share.decrypted("f1").share_url.expect("share url");
    assert_eq!(url.num_accesses, NumAccesses::Known(5));
}

#[test]
fn test_new_share_url_starts_at_zero() {
    let share = TestShare::seeded(vec![decrypted(file("f1", "root", "rev-1"))]);

    share.set(vec![encrypted_only(shared(
        file("f1", "root", "rev-1"),
        NumAccesses::Unknown,
    ))]);

    let url = share.decrypted("f1").share_url.expect("share url");
    assert_eq!(url.num_accesses, NumAccesses::Known(0));
    assert_eq!(share.cache.get_shared_by_link(&share.share_id).len(), 1);
}

#[test]
fn test_known_counter_wins() {
    let share = TestShare::seeded(vec![decrypted(shared(
        file("f1", "root", "rev-1"),
        NumAccesses::Known(5),
    ))]);

    share.set(vec![encrypted_only(shared(
        file("f1", "root", "rev-1"),
        NumAccesses::Known(9),
    ))]);

    let url = share.decrypted("f1").share_url.expect("share url");
    assert_eq!(url.num_accesses, NumAccesses::Known(9));
}

// ── Thumbnails ─────────────────────────────────────────────

#[test]
fn test_thumbnail_kept_for_same_revision() {
    let share = TestShare::seeded(vec![decrypted(file("f1", "root", "rev-1"))]);
    share
        .cache
        .set_cached_thumbnail(&share.share_id, &id("f1"), "blob:thumb");

    share.set(vec![encrypted_only(file("f1", "root", "rev-1"))]);

    assert_eq!(
        share.decrypted("f1").cached_thumbnail_url.as_deref(),
        Some("blob:thumb")
    );
}

#[test]
fn test_thumbnail_dropped_on_new_revision() {
    let share = TestShare::seeded(vec![decrypted(file("f1", "root", "rev-1"))]);
    share
        .cache
        .set_cached_thumbnail(&share.share_id, &id("f1"), "blob:thumb");

    share.set(vec![encrypted_only(file("f1", "root", "rev-2"))]);

    let projection = share.decrypted("f1");
    assert!(projection.cached_thumbnail_url.is_none());
    assert!(projection.is_stale);
}

// ── Tree ───────────────────────────────────────────────────

#[test]
fn test_move_updates_both_parents() {
    let share = TestShare::seeded(vec![
        encrypted_only(folder("a", "root")),
        encrypted_only(folder("b", "root")),
        encrypted_only(file("f1", "a", "rev-1")),
    ]);
    assert_eq!(share.child_ids("a"), vec!["f1"]);

    share.set(vec![encrypted_only(file("f1", "b", "rev-1"))]);

    assert!(share.child_ids("a").is_empty());
    assert_eq!(share.child_ids("b"), vec!["f1"]);
    share.assert_tree_consistent();
}

#[test]
fn test_trashing_removes_from_children() {
    let share = TestShare::seeded(vec![
        encrypted_only(file("f1", "root", "rev-1")),
        encrypted_only(file("f2", "root", "rev-1")),
    ]);

    share.set(vec![encrypted_only(
        file("f1", "root", "rev-1").with_trashed(Some(at(0))),
    )]);

    assert_eq!(share.child_ids("root"), vec!["f2"]);
    let trashed = share.cache.get_trashed(&share.share_id);
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].link_id(), &id("f1"));
    share.assert_tree_consistent();

    // Restoring puts it back.
    share.set(vec![encrypted_only(file("f1", "root", "rev-1"))]);
    assert_eq!(share.child_ids("root"), vec!["f2", "f1"]);
    share.assert_tree_consistent();
}

#[test]
fn test_trashed_link_never_registers_parent() {
    let share = TestShare::seeded(vec![encrypted_only(
        file("f1", "ghost", "rev-1").with_trashed(Some(at(0))),
    )]);

    let state = share.cache.snapshot(&share.share_id).expect("share");
    assert!(state.child_ids(&id("ghost")).is_empty());
    share.assert_tree_consistent();
}

#[test]
fn test_child_listed_before_parent() {
    let share = TestShare::seeded(vec![encrypted_only(file("f1", "a", "rev-1"))]);
    share.set(vec![encrypted_only(folder("a", "root"))]);

    assert_eq!(share.child_ids("a"), vec!["f1"]);
    assert_eq!(share.child_ids("root"), vec!["a"]);
    share.assert_tree_consistent();
}

// ── Trash locking ──────────────────────────────────────────

#[test]
fn test_lock_trash_locks_decrypted_trashed_links() {
    let share = TestShare::seeded(vec![
        decrypted(file("t1", "root", "rev-1").with_trashed(Some(at(-60)))),
        decrypted(file("f1", "root", "rev-1")),
    ]);

    share.cache.lock_trash_at(&share.share_id, at(0));

    assert!(share.decrypted("t1").is_locked);
    assert!(!share.decrypted("f1").is_locked);
}

#[test]
fn test_late_trashed_links_lock_retroactively() {
    let share = TestShare::seeded(vec![]);
    share.cache.lock_trash_at(&share.share_id, at(0));

    share.set(vec![
        decrypted(file("before", "root", "rev-1").with_trashed(Some(at(-10)))),
        decrypted(file("after", "root", "rev-1").with_trashed(Some(at(10)))),
        decrypted(file("live", "root", "rev-1")),
    ]);

    assert!(share.decrypted("before").is_locked);
    assert!(!share.decrypted("after").is_locked);
    assert!(!share.decrypted("live").is_locked);
    assert_eq!(
        share
            .cache
            .snapshot(&share.share_id)
            .and_then(|state| state.latest_trash_emptied_at()),
        Some(at(0))
    );
}

// ── Deletion ───────────────────────────────────────────────

fn nested(mode: DeleteMode) -> TestShare {
    let share = TestShare::with_delete_mode(mode);
    share.set(vec![
        encrypted_only(EncryptedLink::folder("root", None)),
        encrypted_only(folder("a", "root")),
        encrypted_only(folder("b", "a")),
        encrypted_only(file("c", "b", "rev-1")),
        encrypted_only(file("t", "a", "rev-1").with_trashed(Some(at(0)))),
        encrypted_only(folder("keep", "root")),
    ]);
    share
}

#[test]
fn test_recursive_delete_removes_whole_subtree() {
    let share = nested(DeleteMode::Recursive);

    assert!(share.cache.delete_links(&share.share_id, &[id("a")]));

    for gone in ["a", "b", "c", "t"] {
        assert!(!share.contains(gone), "{gone} should be deleted");
    }
    assert!(share.contains("keep"));
    assert_eq!(share.child_ids("root"), vec!["keep"]);
    share.assert_tree_consistent();
}

#[test]
fn test_shallow_delete_removes_direct_children_only() {
    let share = nested(DeleteMode::Shallow);

    assert!(share.cache.delete_links(&share.share_id, &[id("a")]));

    assert!(!share.contains("a"));
    assert!(!share.contains("b"));
    assert!(share.contains("c"));
    // Trashed children are not registered in the tree.
    assert!(share.contains("t"));
    assert_eq!(share.child_ids("root"), vec!["keep"]);
}

#[test]
fn test_delete_unknown_link_is_noop() {
    let share = nested(DeleteMode::Recursive);
    assert!(!share.cache.delete_links(&share.share_id, &[id("missing")]));
    assert_eq!(share.cache.get_all_links(&share.share_id).len(), 6);
}

#[test]
fn test_delete_event_cascades() {
    let share = nested(DeleteMode::Recursive);

    let applied = share.cache.apply_events(
        &share.share_id,
        &[LinkEvent::new(EventType::Delete, folder("b", "a"))],
    );

    assert!(applied);
    assert!(!share.contains("b"));
    assert!(!share.contains("c"));
    assert!(share.child_ids("a").is_empty());
    share.assert_tree_consistent();
}

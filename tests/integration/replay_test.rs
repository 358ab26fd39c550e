//! Integration tests for fixture replay.

use std::path::PathBuf;

use drivelinks::fixture::Fixture;
use drivelinks::replay::{Delivery, ReplayReport, replay};
use drivelinks_core::config::AppConfig;
use drivelinks_core::config::cache::DeleteMode;
use drivelinks_core::types::{LinkId, ShareId};
use drivelinks_entity::{EncryptedLink, EventBatch, EventType, Link, LinkEvent};

fn demo_fixture() -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/share.json");
    Fixture::load(&path).unwrap()
}

fn tree_links(report: &ReplayReport) -> Vec<&str> {
    report.tree.iter().map(|row| row.link.as_str()).collect()
}

fn assert_demo_report(report: &ReplayReport) {
    assert_eq!(report.batches_applied, 1);
    assert_eq!(
        tree_links(report),
        vec!["root", "  docs", "    report", "    notes"]
    );

    let report_row = &report.tree[2];
    assert_eq!(report_row.name, "report.pdf");
    assert!(report_row.stale);
    assert_eq!(report_row.accesses, "5");

    let notes_row = &report.tree[3];
    assert_eq!(notes_row.name, "-");

    assert_eq!(report.trashed, vec![LinkId::from("old")]);
    assert_eq!(report.shared_by_link, vec![LinkId::from("report")]);
    assert_eq!(report.stats.links, 5);
    assert_eq!(report.stats.decrypted, 4);
    assert_eq!(report.stats.stale, 1);
    assert_eq!(report.stats.locked, 1);
    assert_eq!(report.stats.trashed, 1);
}

#[tokio::test]
async fn test_replay_through_subscription() {
    let report = replay(&AppConfig::default(), demo_fixture(), Delivery::Subscribed)
        .await
        .unwrap();
    assert_demo_report(&report);
}

#[tokio::test]
async fn test_replay_through_queue() {
    let report = replay(&AppConfig::default(), demo_fixture(), Delivery::Queued)
        .await
        .unwrap();
    assert_demo_report(&report);
}

#[tokio::test]
async fn test_replay_deleting_folder_in_shallow_mode() {
    let mut fixture = demo_fixture();
    let delete: EventBatch = serde_json::from_str(
        r#"{ "events": [ { "event_type": "delete", "encrypted_link": {
            "link_id": "root", "kind": "folder", "name": "enc:root",
            "created_at": "2026-01-01T00:00:00Z", "modified_at": "2026-01-01T00:00:00Z" } } ] }"#,
    )
    .unwrap();
    fixture.batches.push(delete);

    let mut config = AppConfig::default();
    config.cache.delete_mode = DeleteMode::Shallow;
    let report = replay(&config, fixture, Delivery::Subscribed).await.unwrap();

    // Root and its registered child are gone; deeper links and the
    // trashed file survive.
    assert!(report.tree.is_empty());
    assert_eq!(report.stats.links, 3);
    assert_eq!(report.trashed, vec![LinkId::from("old")]);
    assert_eq!(report.batches_applied, 2);
}

#[tokio::test]
async fn test_replay_survives_folder_moved_under_its_child() {
    let fixture = Fixture {
        share_id: ShareId::from("share-cycle"),
        root_link_id: LinkId::from("root"),
        listing: vec![
            Link::encrypted(EncryptedLink::folder("root", None)),
            Link::encrypted(EncryptedLink::folder("a", Some(LinkId::from("root")))),
        ],
        lock_trash: false,
        late_listing: Vec::new(),
        batches: vec![EventBatch::new(vec![LinkEvent::new(
            EventType::Update,
            EncryptedLink::folder("root", Some(LinkId::from("a"))),
        )])],
    };

    for delivery in [Delivery::Subscribed, Delivery::Queued] {
        let report = replay(&AppConfig::default(), fixture.clone(), delivery)
            .await
            .unwrap();

        assert_eq!(tree_links(&report), vec!["root", "  a"]);
        assert_eq!(report.stats.links, 2);
    }
}

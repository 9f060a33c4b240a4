//! Integration test: collections persisted in a sled directory.
//!
//! ## Scenarios
//! 1. Saved collections survive closing and reopening the store.
//! 2. Create-then-delete leaves the stored collection equal by content.
//! 3. Deleting a challenge removes its linked solutions on disk.
//! 4. Failed mutations write nothing.
//! 5. Writes are mirrored as `<key>.json` when sync is attached.
//! 6. CSV and text exports of a stored collection.
//! 7. A stored collection that fails to decode is never overwritten.
//! 8. Command-line style updates coerce fields the way creation does.

use atelier_core::entities::{Design, DesignSort, Signal};
use atelier_core::export::{to_csv_with, to_text};
use atelier_core::{
    EntityKind, FormInput, KeyValueStore, MirrorSink, SledStore, Studio, StudioConfig, SyncQueue,
    ViewParams,
};
use std::sync::Arc;

fn open_studio(dir: &std::path::Path) -> (Studio, Arc<SledStore>) {
    let store = Arc::new(SledStore::open_path(dir).expect("open sled"));
    (Studio::with_store(store.clone()), store)
}

#[test]
fn collections_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let (studio, store) = open_studio(dir.path());
        let signal = studio
            .signals
            .create(&FormInput::new().with("title", "Resale Boom").with("strength", "72"))
            .unwrap();
        studio.signals.toggle_favorite(&signal.id).unwrap();
        store.flush().unwrap();
        signal.id
    };

    let (studio, _store) = open_studio(dir.path());
    let signals: Vec<Signal> = studio.signals.load();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].id, id);
    assert_eq!(signals[0].strength, 72.0);
    assert!(signals[0].favorited);
}

#[test]
fn create_then_delete_restores_collection() {
    let dir = tempfile::tempdir().unwrap();
    let (studio, _store) = open_studio(dir.path());
    for name in ["Parka", "Loafer"] {
        studio.designs.create(&FormInput::new().with("name", name)).unwrap();
    }
    let before = studio.designs.load();

    let added = studio
        .designs
        .create(&FormInput::new().with("name", "Tote").with("cost", "40"))
        .unwrap();
    assert_eq!(studio.designs.load().len(), 3);
    studio.designs.delete(&added.id).unwrap();

    assert_eq!(studio.designs.load(), before);
}

#[test]
fn challenge_delete_cascades_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (studio, store) = open_studio(dir.path());
        let challenge = studio
            .challenges
            .create(&FormInput::new().with("title", "Fabric waste"))
            .unwrap();
        for title in ["Offcut marketplace", "Zero-waste patterns"] {
            studio
                .solutions
                .create(
                    &FormInput::new()
                        .with("title", title)
                        .with("challengeId", challenge.id.as_str()),
                )
                .unwrap();
        }
        studio
            .solutions
            .create(&FormInput::new().with("title", "Unlinked idea"))
            .unwrap();

        let outcome = studio.delete_challenge(&challenge.id).unwrap();
        assert_eq!(outcome.removed_children.len(), 2);
        store.flush().unwrap();
    }

    let (studio, _store) = open_studio(dir.path());
    assert!(studio.challenges.load().is_empty());
    let left = studio.solutions.load();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].title, "Unlinked idea");
}

#[test]
fn failed_mutations_leave_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (studio, store) = open_studio(dir.path());
    let proto = studio
        .prototypes
        .create(&FormInput::new().with("title", "Smart hanger"))
        .unwrap();
    let raw_before = store.get(EntityKind::Prototype.store_key()).unwrap();

    assert!(studio.prototypes.create(&FormInput::new().with("title", "  ")).is_err());
    let patch = serde_json::json!({ "status": "Launched" });
    assert!(studio.prototypes.update(&proto.id, patch.as_object().unwrap()).is_err());
    let patch = serde_json::json!({ "title": "" });
    assert!(studio.prototypes.update(&proto.id, patch.as_object().unwrap()).is_err());
    assert!(studio.prototypes.delete("missing").is_err());

    assert_eq!(store.get(EntityKind::Prototype.store_key()).unwrap(), raw_before);
}

#[test]
fn comments_are_not_pinnable() {
    let dir = tempfile::tempdir().unwrap();
    let (studio, _store) = open_studio(dir.path());
    let comment = studio
        .comments
        .create(&FormInput::new().with("text", "Check margins"))
        .unwrap();
    assert!(studio.comments.toggle_favorite(&comment.id).is_err());
    assert_eq!(studio.signal_title(&comment), "Unknown");
}

#[tokio::test]
async fn writes_are_mirrored_when_sync_is_attached() {
    let dir = tempfile::tempdir().unwrap();
    let mirror = MirrorSink::new(dir.path().join("mirror"));
    let (queue, handle) = SyncQueue::spawn(Arc::new(mirror.clone()));
    let store = SledStore::open_path(dir.path().join("db")).unwrap().with_sync(queue);
    assert!(store.is_syncing());

    let studio = Studio::with_store(Arc::new(store));
    studio.assets.create(&FormInput::new().with("name", "Wordmark")).unwrap();
    studio.assets.create(&FormInput::new().with("name", "Palette v2")).unwrap();
    drop(studio);

    assert_eq!(handle.await.unwrap(), 2);
    let mirrored = std::fs::read_to_string(mirror.path_for("bc_assets")).unwrap();
    let assets: Vec<serde_json::Value> = serde_json::from_str(&mirrored).unwrap();
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[1]["name"], "Palette v2");
}

#[tokio::test]
async fn studio_open_uses_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let config = StudioConfig {
        storage_path: dir.path().to_path_buf(),
        mirror_path: Some(dir.path().join("mirror")),
        ..StudioConfig::default()
    };
    let (studio, handle) = Studio::open(&config).unwrap();
    studio.rounds.create(&FormInput::new().with("name", "Seed")).unwrap();
    drop(studio);

    let handle = handle.expect("mirror configured");
    assert_eq!(handle.await.unwrap(), 1);
    assert!(config.db_path().exists());
    assert!(dir.path().join("mirror/fd_rounds.json").exists());
}

#[test]
fn exports_of_a_stored_collection() {
    let dir = tempfile::tempdir().unwrap();
    let (studio, _store) = open_studio(dir.path());
    studio
        .designs
        .create(&FormInput::new().with("name", "X, Y").with("cost", "5"))
        .unwrap();

    let designs: Vec<Design> = studio.designs.load();
    assert_eq!(
        to_csv_with(&designs, &["Name", "Cost"]).unwrap(),
        "Name,Cost\n\"X, Y\",5\n"
    );

    let view = studio.designs.view(&ViewParams::new().sort_by(DesignSort::Cost));
    let text = to_text("Designs", &view.items, &view.summary);
    assert!(text.starts_with("=== Designs ===\n--- Summary ---\nTotal: 1\n"));
    assert!(text.contains("Apparel: 1 (100.0%)"));
}

#[test]
fn undecodable_collection_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let (studio, store) = open_studio(dir.path());
    studio.designs.create(&FormInput::new().with("name", "Parka")).unwrap();
    let mut stored: Vec<serde_json::Value> =
        serde_json::from_slice(&store.get("fl_designs").unwrap().unwrap()).unwrap();
    stored.push(serde_json::json!({ "id": "d2", "name": "Tote" }));
    let raw = serde_json::to_vec(&stored).unwrap();
    store.put("fl_designs", &raw).unwrap();

    assert!(studio.designs.create(&FormInput::new().with("name", "New")).is_err());
    assert_eq!(store.get("fl_designs").unwrap(), Some(raw));
    let row = studio
        .collection_status()
        .into_iter()
        .find(|r| r.kind == EntityKind::Design)
        .unwrap();
    assert!(row.error.is_some());
}

#[test]
fn form_updates_match_create_coercion() {
    let dir = tempfile::tempdir().unwrap();
    let (studio, _store) = open_studio(dir.path());
    let signal = studio
        .signals
        .create(&FormInput::new().with("title", "Resale Boom").with("strength", "72"))
        .unwrap();

    let form = FormInput::parse_pairs(["title=2024", "tags=eco,denim", "strength=abc", "status=archived"]).unwrap();
    let updated = studio.signals.update_form(&signal.id, &form).unwrap();
    assert_eq!(updated.title, "2024");
    assert_eq!(updated.tags, vec!["eco", "denim"]);
    assert_eq!(updated.strength, 50.0);
    assert_eq!(updated.status.to_string(), "Archived");
    assert_eq!(studio.signals.load(), vec![updated]);
}


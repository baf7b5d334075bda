use shelterboard_core::reconcile::should_reconcile;
use shelterboard_core::{
    reconcile_assignments, Cat, CatPatch, DividerSide, RecordStore, Room, RoomCorrection,
    RoomGeometry, RoomPatch, SqliteRecordStore,
};

fn room(id: &str) -> Room {
    Room::new(id, id, RoomGeometry::new(0, 0, 200, 200))
}

fn cat(id: &str, room_id: Option<&str>) -> Cat {
    let mut cat = Cat::new(id, id);
    cat.assign(room_id.map(str::to_string), None);
    cat
}

#[test]
fn removed_room_yields_exactly_one_correction() {
    let mut rooms = vec![room("r1"), room("r2")];
    let cats = vec![cat("c1", Some("r1")), cat("c2", Some("r2")), cat("c3", None)];

    rooms.retain(|room| room.id != "r1");
    let batch = reconcile_assignments(&cats, &rooms);

    assert_eq!(
        batch.corrections(),
        &[RoomCorrection {
            cat_id: "c1".to_string(),
            stale_room_id: "r1".to_string(),
        }]
    );

    let mut corrected = cats.clone();
    batch.apply_to(&mut corrected);
    assert_eq!(corrected[0].room_id, None);
    assert_eq!(corrected[1], cats[1]);
    assert_eq!(corrected[2], cats[2]);
}

#[test]
fn second_pass_is_empty() {
    let rooms = vec![room("r1")];
    let mut cats = vec![cat("c1", Some("gone")), cat("c2", Some("r1"))];

    let first = reconcile_assignments(&cats, &rooms);
    assert_eq!(first.len(), 1);
    first.apply_to(&mut cats);

    assert!(reconcile_assignments(&cats, &rooms).is_empty());
}

#[test]
fn empty_collections_skip_reactive_pass() {
    let cats = vec![cat("c1", Some("r1"))];
    assert!(!should_reconcile(&cats, &[]));
    assert!(!should_reconcile(&[], &[room("r1")]));
    assert!(should_reconcile(&cats, &[room("r1")]));
}

#[test]
fn corrections_commit_as_one_batch() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    for id in ["r1", "r2"] {
        store
            .upsert_room(id, &RoomPatch::from_room(&room(id)))
            .unwrap();
    }
    for (id, room_id, side) in [
        ("c1", "r1", Some(DividerSide::Left)),
        ("c2", "r1", None),
        ("c3", "r2", None),
    ] {
        let patch = CatPatch {
            name: Some(id.to_string()),
            ..CatPatch::placement(Some(room_id.to_string()), side)
        };
        store.upsert_cat(id, &patch).unwrap();
    }

    store.delete_room("r1").unwrap();
    let cats = store.list_cats().unwrap();
    let rooms = store.list_rooms().unwrap();
    let batch = reconcile_assignments(&cats, &rooms);
    assert_eq!(batch.len(), 2);

    store.batch_write(&batch.to_writes()).unwrap();

    let after = store.list_cats().unwrap();
    for cat in &after[..2] {
        assert_eq!(cat.room_id, None);
        assert_eq!(cat.divider_side, None);
    }
    assert_eq!(after[2].room_id.as_deref(), Some("r2"));
    assert!(reconcile_assignments(&after, &rooms).is_empty());
}

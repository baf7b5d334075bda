use shelterboard_core::placement::drop_target::{FOSTER_LIST_TOKEN, SHELTER_LIST_TOKEN};
use shelterboard_core::placement::resolver::occupancy;
use shelterboard_core::{
    resolve_placement, Cat, CustodyPool, DividerSide, DropTarget, PlacementRejection, Room,
    RoomGeometry,
};

fn room(id: &str, divided: bool, max_cats: Option<u32>) -> Room {
    let mut room = Room::new(id, id, RoomGeometry::new(0, 0, 200, 200));
    room.divided = divided;
    room.max_cats = max_cats;
    room
}

fn cat(id: &str, room_id: Option<&str>, side: Option<DividerSide>) -> Cat {
    let mut cat = Cat::new(id, id);
    cat.assign(room_id.map(str::to_string), side);
    cat
}

/// Resolves a drop and applies the intent the way the board does.
fn drop_onto(cats: &mut Vec<Cat>, rooms: &[Room], cat_id: &str, target: &str) -> bool {
    match resolve_placement(target, cat_id, cats, rooms) {
        Ok(intent) => intent.apply_to(cats),
        Err(_) => false,
    }
}

#[test]
fn undivided_room_rejects_cat_beyond_capacity() {
    for max in 1..=4_u32 {
        let rooms = vec![room("r1", false, Some(max))];
        let mut cats: Vec<Cat> = (0..=max)
            .map(|index| cat(&format!("c{index}"), None, None))
            .collect();

        for index in 0..max {
            assert!(drop_onto(&mut cats, &rooms, &format!("c{index}"), "r1"));
        }
        let before = cats.clone();
        let overflow = format!("c{max}");
        let err = resolve_placement("r1", &overflow, &cats, &rooms).unwrap_err();

        assert_eq!(
            err,
            PlacementRejection::RoomFull {
                room_id: "r1".to_string(),
                side: None,
                max_cats: max,
            }
        );
        assert_eq!(cats, before);
    }
}

#[test]
fn divided_room_pools_fill_independently() {
    let max = 2;
    let rooms = vec![room("r2", true, Some(max))];
    let mut cats: Vec<Cat> = (0..5).map(|index| cat(&format!("c{index}"), None, None)).collect();

    assert!(drop_onto(&mut cats, &rooms, "c0", "r2-left"));
    assert!(drop_onto(&mut cats, &rooms, "c1", "r2-left"));
    assert!(!drop_onto(&mut cats, &rooms, "c2", "r2-left"));

    assert!(drop_onto(&mut cats, &rooms, "c2", "r2-right"));
    assert!(drop_onto(&mut cats, &rooms, "c3", "r2-right"));
    assert!(!drop_onto(&mut cats, &rooms, "c4", "r2-right"));

    assert_eq!(occupancy(&rooms[0], Some(DividerSide::Left), &cats, ""), 2);
    assert_eq!(occupancy(&rooms[0], Some(DividerSide::Right), &cats, ""), 2);
}

#[test]
fn unassigned_tokens_always_clear_placement() {
    let rooms = vec![room("r1", false, Some(1)), room("r2", true, Some(1))];
    let cats = vec![
        cat("c1", Some("r1"), None),
        cat("c2", Some("r2"), Some(DividerSide::Right)),
        cat("c3", Some("deleted-room"), Some(DividerSide::Left)),
        cat("c4", None, None),
    ];

    for token in [SHELTER_LIST_TOKEN, FOSTER_LIST_TOKEN] {
        for moving in &cats {
            let intent = resolve_placement(token, &moving.id, &cats, &rooms).unwrap();
            assert_eq!(intent.cat_id, moving.id);
            assert_eq!(intent.room_id, None);
            assert_eq!(intent.divider_side, None);
        }
    }
}

#[test]
fn unknown_target_leaves_cats_unchanged() {
    let rooms = vec![room("r1", false, None), room("r2", true, None)];
    let mut cats = vec![cat("c1", Some("r1"), None), cat("c2", None, None)];
    let before = serde_json::to_string(&cats).unwrap();

    for token in ["nowhere", "r1-left", "r3-right", "", "r2-middle"] {
        assert!(!drop_onto(&mut cats, &rooms, "c2", token));
    }
    assert_eq!(serde_json::to_string(&cats).unwrap(), before);
}

#[test]
fn drop_target_parser_builds_tagged_variants() {
    let rooms = vec![room("r2", true, None), room("pen-left", false, None)];

    assert_eq!(
        DropTarget::parse(SHELTER_LIST_TOKEN, &rooms),
        Some(DropTarget::Unassigned(CustodyPool::Shelter))
    );
    assert_eq!(
        DropTarget::parse(FOSTER_LIST_TOKEN, &rooms),
        Some(DropTarget::Unassigned(CustodyPool::Foster))
    );
    assert_eq!(
        DropTarget::parse("r2-right", &rooms),
        Some(DropTarget::RoomSide("r2".to_string(), DividerSide::Right))
    );
    assert_eq!(
        DropTarget::parse("pen-left", &rooms),
        Some(DropTarget::WholeRoom("pen-left".to_string()))
    );
    assert_eq!(DropTarget::parse("r9", &rooms), None);
}

#[test]
fn single_slot_room_scenario() {
    let rooms = vec![room("r1", false, Some(1))];
    let mut cats = vec![cat("c1", None, None), cat("c2", None, None)];

    assert!(drop_onto(&mut cats, &rooms, "c1", "r1"));
    assert_eq!(cats[0].room_id.as_deref(), Some("r1"));

    assert!(!drop_onto(&mut cats, &rooms, "c2", "r1"));
    assert_eq!(cats[1].room_id, None);
}

#[test]
fn divided_room_right_side_scenario() {
    let rooms = vec![room("r2", true, Some(2))];
    let mut cats = vec![
        cat("c1", Some("r2"), Some(DividerSide::Left)),
        cat("c2", None, None),
    ];

    assert!(drop_onto(&mut cats, &rooms, "c2", "r2-right"));
    assert_eq!(cats[1].room_id.as_deref(), Some("r2"));
    assert_eq!(cats[1].divider_side, Some(DividerSide::Right));
}

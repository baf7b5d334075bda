use serde_json::json;
use shelterboard_core::ingest::shelterluv::AnimalPage;
use shelterboard_core::{
    AnimalSource, Board, CatPatch, CustodyStatus, DividerSide, DropOutcome, IngestError,
    IngestionJob, RecordStore, Room, RoomGeometry, RoomPatch, SqliteRecordStore,
};
use std::cell::RefCell;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Serves canned pages and records the requested offsets.
struct FakeSource {
    pages: Vec<AnimalPage>,
    requests: RefCell<Vec<(u32, u32)>>,
}

impl FakeSource {
    fn new(pages: Vec<serde_json::Value>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| serde_json::from_value(page).unwrap())
                .collect(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl AnimalSource for FakeSource {
    fn fetch_page(&self, offset: u32, limit: u32) -> Result<AnimalPage, IngestError> {
        let index = self.requests.borrow().len();
        self.requests.borrow_mut().push((offset, limit));
        self.pages.get(index).cloned().ok_or(IngestError::Http {
            status: Some(503),
            message: "no more canned pages".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[test]
fn run_pages_through_listing_and_skips_other_species() {
    let source = FakeSource::new(vec![
        json!({
            "animals": [
                {"Internal-ID": "1", "Name": "Miso", "Type": "Cat"},
                {"Internal-ID": "2", "Name": "Rex", "Type": "Dog"}
            ],
            "has_more": true
        }),
        json!({
            "animals": [
                {"Internal-ID": 3, "Name": "Tofu", "InFoster": true, "Status": "Adopted"}
            ],
            "has_more": false
        }),
    ]);
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let job = IngestionJob::new(source, 2);

    let report = job.run_once(&store).unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.fetched, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, 2);
    assert_eq!(*job.source().requests.borrow(), vec![(0, 2), (2, 2)]);

    let cats = store.list_cats().unwrap();
    assert_eq!(cats.len(), 2);
    let tofu = store.get_cat("3").unwrap().unwrap();
    assert!(tofu.in_foster);
    assert_eq!(tofu.status, CustodyStatus::Adopted);
    assert!(tofu.last_synced_at.is_some());
}

#[test]
fn malformed_record_on_later_page_writes_nothing() {
    let source = FakeSource::new(vec![
        json!({
            "animals": [{"Internal-ID": "1", "Name": "Miso"}],
            "has_more": true
        }),
        json!({
            "animals": [{"Internal-ID": "2"}],
            "has_more": false
        }),
    ]);
    let store = SqliteRecordStore::open_in_memory().unwrap();

    let err = IngestionJob::new(source, 100).run_once(&store).unwrap_err();

    assert!(matches!(err, IngestError::Malformed(_)));
    assert!(store.list_cats().unwrap().is_empty());
}

#[test]
fn empty_page_claiming_more_results_is_malformed() {
    let source = FakeSource::new(vec![json!({"animals": [], "has_more": true})]);
    let store = SqliteRecordStore::open_in_memory().unwrap();

    let err = IngestionJob::new(source, 100).run_once(&store).unwrap_err();
    assert!(matches!(err, IngestError::Malformed(_)));
}

#[test]
fn fetch_failure_fails_the_run() {
    let source = FakeSource::new(vec![json!({
        "animals": [{"Internal-ID": "1", "Name": "Miso"}],
        "has_more": true
    })]);
    let store = SqliteRecordStore::open_in_memory().unwrap();

    let err = IngestionJob::new(source, 100).run_once(&store).unwrap_err();
    assert!(matches!(err, IngestError::Http { status: Some(503), .. }));
    assert!(store.list_cats().unwrap().is_empty());
}

#[test]
fn resync_keeps_room_assignment() {
    let page = json!({
        "animals": [{"Internal-ID": "1", "Name": "Miso", "Color": "Grey"}],
        "has_more": false
    });
    let store = SqliteRecordStore::open_in_memory().unwrap();
    IngestionJob::new(FakeSource::new(vec![page.clone()]), 100)
        .run_once(&store)
        .unwrap();
    store
        .upsert_cat(
            "1",
            &CatPatch::placement(Some("r2".to_string()), Some(DividerSide::Left)),
        )
        .unwrap();

    IngestionJob::new(FakeSource::new(vec![page]), 100)
        .run_once(&store)
        .unwrap();

    let cat = store.get_cat("1").unwrap().unwrap();
    assert_eq!(cat.room_id.as_deref(), Some("r2"));
    assert_eq!(cat.divider_side, Some(DividerSide::Left));
    assert_eq!(cat.color.as_deref(), Some("Grey"));
}

#[test]
fn page_size_is_clamped_to_api_limit() {
    let source = FakeSource::new(vec![json!({"animals": [], "has_more": false})]);
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let job = IngestionJob::new(source, 1_000);

    let report = job.run_once(&store).unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(*job.source().requests.borrow(), vec![(0, 100)]);
}

#[test]
fn scheduled_runner_stops_when_asked() {
    let source = FakeSource::new(vec![json!({"animals": [], "has_more": false})]);
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let stop = AtomicBool::new(true);

    let runs = IngestionJob::new(source, 100).run_every(&store, Duration::from_secs(60), &stop);
    assert_eq!(runs, 0);
}

#[test]
fn adoption_is_picked_up_and_frees_the_room_slot() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let mut r1 = Room::new("r1", "Room 1", RoomGeometry::new(0, 0, 200, 200));
    r1.max_cats = Some(1);
    store.upsert_room("r1", &RoomPatch::from_room(&r1)).unwrap();

    IngestionJob::new(
        FakeSource::new(vec![json!({
            "animals": [
                {"Internal-ID": "c1", "Name": "Miso", "Status": "Available"},
                {"Internal-ID": "c2", "Name": "Nori", "Status": "Available"}
            ],
            "has_more": false
        })]),
        100,
    )
    .run_once(&store)
    .unwrap();
    store
        .upsert_cat("c1", &CatPatch::placement(Some("r1".to_string()), None))
        .unwrap();

    IngestionJob::new(
        FakeSource::new(vec![json!({
            "animals": [
                {"Internal-ID": "c1", "Name": "Miso", "Status": "Healthy In Home"},
                {"Internal-ID": "c2", "Name": "Nori", "Status": "Available"}
            ],
            "has_more": false
        })]),
        100,
    )
    .run_once(&store)
    .unwrap();

    let adopted = store.get_cat("c1").unwrap().unwrap();
    assert_eq!(adopted.status, CustodyStatus::Adopted);
    assert_eq!(adopted.room_id.as_deref(), Some("r1"));

    let mut board = Board::new(&store);
    board.load().unwrap();
    assert!(board.room_occupants("r1").unwrap().left.is_empty());
    assert!(matches!(
        board.drop_cat("c2", Some("r1")),
        DropOutcome::Placed(_)
    ));
}

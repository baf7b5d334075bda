//! Floorplan board service.
//!
//! # Responsibility
//! - Own the in-memory cat and room snapshots of one dashboard session.
//! - Run the placement resolver on drops, with optimistic update and
//!   rollback on write failure.
//! - Run the reconciler whenever a snapshot changes.
//! - Apply room edit-mode gestures locally and commit them at gesture end.
//!
//! # Invariants
//! - The board is the only writer of its snapshots.
//! - A failed placement write rolls the cat back to the null placement, not
//!   to its previous room.
//! - Drops are ignored while edit mode is on.

use crate::model::cat::{Cat, CustodyPool, DividerSide};
use crate::model::room::{Room, RoomGeometry, RoomId, RoomPatch};
use crate::placement::resolver::{
    resolve_placement, room_occupants, PlacementIntent, PlacementRejection, RoomOccupants,
};
use crate::reconcile::{reconcile_assignments, should_reconcile};
use crate::store::{RecordStore, SnapshotEvent, StoreError, StoreResult, Subscription};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of a drag-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No target, unknown cat, or edit mode: nothing happened.
    Ignored,
    /// Resolver refused the drop; state unchanged.
    Rejected(PlacementRejection),
    /// Applied locally and persisted.
    Placed(PlacementIntent),
    /// Applied locally, the write failed, and the cat was reset to the null
    /// placement.
    RolledBack { intent: PlacementIntent, error: String },
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// One of the collections is empty.
    Skipped,
    /// No dangling references.
    Clean,
    /// This many cats were cleared and persisted.
    Corrected(usize),
    /// Batch write failed; the next snapshot retries.
    Failed(String),
}

/// Errors surfaced by board operations that talk to the store.
#[derive(Debug)]
pub enum BoardError {
    /// Edit-mode operation attempted outside edit mode.
    NotEditing,
    UnknownRoom(RoomId),
    /// A subscription delivered its terminal error.
    SubscriptionFailed(String),
    Store(StoreError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEditing => write!(f, "room editing requires edit mode"),
            Self::UnknownRoom(id) => write!(f, "room not found: {id}"),
            Self::SubscriptionFailed(message) => write!(f, "subscription failed: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Kind of edit-mode pointer gesture on a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomGestureKind {
    Move,
    Resize,
}

#[derive(Debug, Clone)]
struct RoomGesture {
    room_id: RoomId,
    kind: RoomGestureKind,
    start: RoomGeometry,
}

/// In-memory floorplan state bound to a record store.
pub struct Board<S: RecordStore> {
    store: S,
    cats: Vec<Cat>,
    rooms: Vec<Room>,
    edit_mode: bool,
    gesture: Option<RoomGesture>,
}

impl<S: RecordStore> Board<S> {
    /// Creates an empty board; call `load` or feed snapshots next.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cats: Vec::new(),
            rooms: Vec::new(),
            edit_mode: false,
            gesture: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cats(&self) -> &[Cat] {
        &self.cats
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn cat(&self, id: &str) -> Option<&Cat> {
        self.cats.iter().find(|cat| cat.id == id)
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Reads both collections from the store and reconciles.
    pub fn load(&mut self) -> StoreResult<ReconcileOutcome> {
        let rooms = self.store.list_rooms()?;
        self.replace_rooms(rooms);
        self.cats = self.store.list_cats()?;
        Ok(self.reconcile())
    }

    /// Replaces the cat snapshot and reconciles.
    pub fn apply_cat_snapshot(&mut self, cats: Vec<Cat>) -> ReconcileOutcome {
        self.cats = cats;
        self.reconcile()
    }

    /// Replaces the room snapshot and reconciles.
    pub fn apply_room_snapshot(&mut self, rooms: Vec<Room>) -> ReconcileOutcome {
        self.replace_rooms(rooms);
        self.reconcile()
    }

    /// Swaps in a room snapshot, abandoning a gesture whose room is gone.
    fn replace_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        if let Some(gesture) = &self.gesture {
            if !self.rooms.iter().any(|room| room.id == gesture.room_id) {
                self.gesture = None;
            }
        }
    }

    /// Drains both subscriptions and applies the newest snapshots.
    ///
    /// Returns whether anything was applied.
    ///
    /// # Errors
    /// `SubscriptionFailed` when either subscription delivered its terminal
    /// error. Snapshots received before the failure are still applied.
    pub fn pump(
        &mut self,
        cats: &Subscription<Cat>,
        rooms: &Subscription<Room>,
    ) -> Result<bool, BoardError> {
        let mut applied = false;
        let mut failure = None;

        match rooms.latest() {
            Some(SnapshotEvent::Snapshot(snapshot)) => {
                self.replace_rooms(snapshot);
                applied = true;
            }
            Some(SnapshotEvent::Failed(message)) => failure = Some(message),
            None => {}
        }
        match cats.latest() {
            Some(SnapshotEvent::Snapshot(snapshot)) => {
                self.cats = snapshot;
                applied = true;
            }
            Some(SnapshotEvent::Failed(message)) => failure = failure.or(Some(message)),
            None => {}
        }

        if applied {
            self.reconcile();
        }
        match failure {
            Some(message) => {
                error!("event=subscription module=board status=error error={message}");
                Err(BoardError::SubscriptionFailed(message))
            }
            None => Ok(applied),
        }
    }

    /// Detects and clears dangling room references.
    ///
    /// Corrections are written as one atomic batch and, on success, applied
    /// to the local snapshot. A failed batch is left for the next pass.
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        if !should_reconcile(&self.cats, &self.rooms) {
            return ReconcileOutcome::Skipped;
        }
        let batch = reconcile_assignments(&self.cats, &self.rooms);
        if batch.is_empty() {
            return ReconcileOutcome::Clean;
        }

        match self.store.batch_write(&batch.to_writes()) {
            Ok(()) => {
                batch.apply_to(&mut self.cats);
                info!(
                    "event=reconcile module=board status=ok corrected={}",
                    batch.len()
                );
                ReconcileOutcome::Corrected(batch.len())
            }
            Err(err) => {
                warn!(
                    "event=reconcile module=board status=error pending={} error={}",
                    batch.len(),
                    err
                );
                ReconcileOutcome::Failed(err.to_string())
            }
        }
    }

    /// Handles the end of a cat drag.
    ///
    /// `over` is the drop-target token, or `None` when the gesture ended
    /// outside every target.
    pub fn drop_cat(&mut self, cat_id: &str, over: Option<&str>) -> DropOutcome {
        let Some(token) = over else {
            return DropOutcome::Ignored;
        };
        if self.edit_mode || self.cat(cat_id).is_none() {
            return DropOutcome::Ignored;
        }

        let intent = match resolve_placement(token, cat_id, &self.cats, &self.rooms) {
            Ok(intent) => intent,
            Err(rejection) => {
                debug!(
                    "event=cat_drop module=board status=rejected cat_id={cat_id} target={token} reason={rejection}"
                );
                return DropOutcome::Rejected(rejection);
            }
        };

        intent.apply_to(&mut self.cats);
        match self.store.upsert_cat(&intent.cat_id, &intent.patch()) {
            Ok(_) => {
                info!(
                    "event=cat_drop module=board status=ok cat_id={} room_id={} side={}",
                    intent.cat_id,
                    intent.room_id.as_deref().unwrap_or("none"),
                    intent.divider_side.map_or("none", |side| side.as_str())
                );
                DropOutcome::Placed(intent)
            }
            Err(err) => {
                error!(
                    "event=cat_drop module=board status=error cat_id={} error={}",
                    intent.cat_id, err
                );
                PlacementIntent::unassigned(intent.cat_id.clone()).apply_to(&mut self.cats);
                DropOutcome::RolledBack {
                    intent,
                    error: err.to_string(),
                }
            }
        }
    }

    /// In-custody cats, on site or in foster.
    pub fn in_custody_cats(&self) -> Vec<&Cat> {
        self.cats.iter().filter(|cat| cat.is_in_custody()).collect()
    }

    /// In-custody cats on site; these are the ones shown on the floorplan.
    pub fn shelter_cats(&self) -> Vec<&Cat> {
        self.pool_cats(CustodyPool::Shelter)
    }

    pub fn foster_cats(&self) -> Vec<&Cat> {
        self.pool_cats(CustodyPool::Foster)
    }

    /// On-site cats with no room, for the unassigned list.
    pub fn unassigned_shelter_cats(&self) -> Vec<&Cat> {
        self.pool_cats(CustodyPool::Shelter)
            .into_iter()
            .filter(|cat| cat.room_id.is_none())
            .collect()
    }

    /// Cats inside `room_id`, split by side.
    pub fn room_occupants(&self, room_id: &str) -> Option<RoomOccupants<'_>> {
        let room = self.room(room_id)?;
        Some(room_occupants(room, &self.cats))
    }

    /// Room and effective side a cat is shown in.
    ///
    /// The stored side is ignored for undivided rooms, and a side-less cat in
    /// a divided room reports the left pool. `None` when the cat is
    /// unassigned or its room is not in the snapshot.
    pub fn cat_placement(&self, cat: &Cat) -> Option<(&Room, Option<DividerSide>)> {
        let room = self.room(cat.room_id.as_deref()?)?;
        Some((room, room.effective_side(cat.divider_side)))
    }

    fn pool_cats(&self, pool: CustodyPool) -> Vec<&Cat> {
        self.cats
            .iter()
            .filter(|cat| cat.is_in_custody() && cat.pool() == pool)
            .collect()
    }

    /// Room of the active edit gesture, if any.
    pub fn gesture_room_id(&self) -> Option<&str> {
        self.gesture.as_ref().map(|gesture| gesture.room_id.as_str())
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Toggles edit mode. Leaving it abandons any unfinished gesture.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
        if !enabled {
            self.gesture = None;
        }
    }

    /// Starts a move or resize gesture on `room_id`.
    pub fn begin_room_gesture(
        &mut self,
        room_id: &str,
        kind: RoomGestureKind,
    ) -> Result<(), BoardError> {
        if !self.edit_mode {
            return Err(BoardError::NotEditing);
        }
        let room = self
            .room(room_id)
            .ok_or_else(|| BoardError::UnknownRoom(room_id.to_string()))?;
        self.gesture = Some(RoomGesture {
            room_id: room.id.clone(),
            kind,
            start: room.geometry,
        });
        Ok(())
    }

    /// Applies the total pointer delta since the gesture started.
    ///
    /// Local only; nothing is written until `end_room_gesture`.
    pub fn update_room_gesture(&mut self, dx: i64, dy: i64) -> Option<&Room> {
        let gesture = self.gesture.as_ref()?;
        let next = match gesture.kind {
            RoomGestureKind::Move => gesture.start.moved_by(dx, dy),
            RoomGestureKind::Resize => gesture.start.resized_by(dx, dy),
        };
        let room_id = gesture.room_id.clone();
        let room = self.rooms.iter_mut().find(|room| room.id == room_id)?;
        room.geometry = next;
        Some(room)
    }

    /// Ends the gesture and commits the room's final geometry.
    ///
    /// Returns `Ok(None)` when no gesture was active.
    pub fn end_room_gesture(&mut self) -> Result<Option<Room>, BoardError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(None);
        };
        let room = self
            .room(&gesture.room_id)
            .cloned()
            .ok_or(BoardError::UnknownRoom(gesture.room_id))?;
        let patch = RoomPatch {
            geometry: Some(room.geometry),
            ..RoomPatch::default()
        };
        let committed = self.store.upsert_room(&room.id, &patch)?;
        self.replace_room(committed.clone());
        Ok(Some(committed))
    }

    /// Turns the divider on or off and persists immediately.
    pub fn set_divided(&mut self, room_id: &str, divided: bool) -> Result<Room, BoardError> {
        self.write_room(
            room_id,
            RoomPatch {
                divided: Some(divided),
                ..RoomPatch::default()
            },
        )
    }

    /// Sets or clears the capacity limit and persists immediately.
    pub fn set_max_cats(
        &mut self,
        room_id: &str,
        max_cats: Option<u32>,
    ) -> Result<Room, BoardError> {
        self.write_room(
            room_id,
            RoomPatch {
                max_cats: Some(max_cats),
                ..RoomPatch::default()
            },
        )
    }

    /// Adds a room with a generated id.
    pub fn create_room(
        &mut self,
        label: &str,
        geometry: RoomGeometry,
    ) -> Result<Room, BoardError> {
        if !self.edit_mode {
            return Err(BoardError::NotEditing);
        }
        let draft = Room::create(label, geometry);
        let room = self
            .store
            .upsert_room(&draft.id, &RoomPatch::from_room(&draft))?;
        self.rooms.push(room.clone());
        Ok(room)
    }

    /// Deletes a room, then reconciles the cats it contained.
    pub fn remove_room(&mut self, room_id: &str) -> Result<ReconcileOutcome, BoardError> {
        if !self.edit_mode {
            return Err(BoardError::NotEditing);
        }
        self.store.delete_room(room_id)?;
        self.rooms.retain(|room| room.id != room_id);
        Ok(self.reconcile())
    }

    fn write_room(&mut self, room_id: &str, patch: RoomPatch) -> Result<Room, BoardError> {
        if !self.edit_mode {
            return Err(BoardError::NotEditing);
        }
        if self.room(room_id).is_none() {
            return Err(BoardError::UnknownRoom(room_id.to_string()));
        }
        let room = self.store.upsert_room(room_id, &patch)?;
        self.replace_room(room.clone());
        Ok(room)
    }

    fn replace_room(&mut self, room: Room) {
        match self.rooms.iter_mut().find(|existing| existing.id == room.id) {
            Some(existing) => *existing = room,
            None => self.rooms.push(room),
        }
    }
}

//! Room domain model and floorplan geometry.
//!
//! # Responsibility
//! - Define rooms placed on the fixed virtual canvas.
//! - Provide snap/clamp helpers used by edit-mode move and resize gestures.
//!
//! # Invariants
//! - `0 <= x`, `0 <= y`, `x + width <= CANVAS_WIDTH`, `y + height <= CANVAS_HEIGHT`.
//! - `width >= MIN_ROOM_SIZE` and `height >= MIN_ROOM_SIZE`.
//! - `max_cats` applies per side when `divided`, per room otherwise.

use super::cat::DividerSide;
use super::ModelValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable operator-assigned room identifier.
pub type RoomId = String;

/// Virtual canvas width in floorplan units.
pub const CANVAS_WIDTH: i64 = 1000;
/// Virtual canvas height in floorplan units.
pub const CANVAS_HEIGHT: i64 = 600;
/// Smallest width/height a room may be resized to.
pub const MIN_ROOM_SIZE: i64 = 80;
/// Edit-mode positions and sizes snap to this grid.
pub const GRID_SIZE: i64 = 20;

static ROOM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid room id regex"));

/// Axis-aligned rectangle in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomGeometry {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl RoomGeometry {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Checks canvas bounds and minimum size.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.width < MIN_ROOM_SIZE || self.height < MIN_ROOM_SIZE {
            return Err(ModelValidationError::RoomTooSmall);
        }
        if self.x < 0
            || self.y < 0
            || self.x + self.width > CANVAS_WIDTH
            || self.y + self.height > CANVAS_HEIGHT
        {
            return Err(ModelValidationError::GeometryOutOfBounds);
        }
        Ok(())
    }

    /// Origin moved by a gesture delta, snapped to grid and kept on canvas.
    pub fn moved_by(&self, dx: i64, dy: i64) -> Self {
        let next_x = snap_to_grid(self.x + dx);
        let next_y = snap_to_grid(self.y + dy);
        Self {
            x: next_x.min(CANVAS_WIDTH - self.width).max(0),
            y: next_y.min(CANVAS_HEIGHT - self.height).max(0),
            ..*self
        }
    }

    /// Size changed by a gesture delta, snapped to grid and clamped to
    /// `[MIN_ROOM_SIZE, canvas extent - origin]`.
    pub fn resized_by(&self, dw: i64, dh: i64) -> Self {
        let next_width = snap_to_grid(self.width + dw);
        let next_height = snap_to_grid(self.height + dh);
        Self {
            width: next_width.min(CANVAS_WIDTH - self.x).max(MIN_ROOM_SIZE),
            height: next_height.min(CANVAS_HEIGHT - self.y).max(MIN_ROOM_SIZE),
            ..*self
        }
    }
}

/// Rounds to the nearest grid line; halves round toward positive infinity.
pub fn snap_to_grid(value: i64) -> i64 {
    (value + GRID_SIZE / 2).div_euclid(GRID_SIZE) * GRID_SIZE
}

/// Canonical room record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub label: String,
    #[serde(flatten)]
    pub geometry: RoomGeometry,
    /// Splits the room into two independent capacity pools.
    pub divided: bool,
    /// Per side when divided, per room otherwise. `None` means unlimited.
    pub max_cats: Option<u32>,
    /// Epoch ms, maintained by the store.
    pub updated_at: Option<i64>,
}

impl Room {
    /// Creates an undivided room without a capacity limit.
    pub fn new(id: impl Into<RoomId>, label: impl Into<String>, geometry: RoomGeometry) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            geometry,
            divided: false,
            max_cats: None,
            updated_at: None,
        }
    }

    /// Creates a room with a generated id, for rooms added in edit mode.
    pub fn create(label: impl Into<String>, geometry: RoomGeometry) -> Self {
        Self::new(format!("room-{}", Uuid::new_v4().simple()), label, geometry)
    }

    /// Checks id, label, geometry and capacity invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_room_id(&self.id)?;
        if self.label.trim().is_empty() {
            return Err(ModelValidationError::EmptyLabel);
        }
        self.geometry.validate()?;
        if self.max_cats == Some(0) {
            return Err(ModelValidationError::ZeroCapacity);
        }
        Ok(())
    }

    /// Side a cat actually occupies in this room.
    ///
    /// Undivided rooms have no sides. In a divided room a cat without an
    /// explicit side sits in the left pool.
    pub fn effective_side(&self, side: Option<DividerSide>) -> Option<DividerSide> {
        if self.divided {
            Some(side.unwrap_or(DividerSide::Left))
        } else {
            None
        }
    }

    /// Drop-target tokens a presentation layer registers for this room.
    pub fn drop_target_ids(&self) -> Vec<String> {
        if self.divided {
            vec![
                format!("{}-{}", self.id, DividerSide::Left.as_str()),
                format!("{}-{}", self.id, DividerSide::Right.as_str()),
            ]
        } else {
            vec![self.id.clone()]
        }
    }
}

/// Checks that a room id is non-empty and free of whitespace/punctuation
/// outside `.`, `_`, `-`.
pub fn validate_room_id(id: &str) -> Result<(), ModelValidationError> {
    if id.trim().is_empty() {
        return Err(ModelValidationError::EmptyId);
    }
    if !ROOM_ID_RE.is_match(id) {
        return Err(ModelValidationError::InvalidRoomId(id.to_string()));
    }
    Ok(())
}

/// Partial room update with merge semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomPatch {
    pub label: Option<String>,
    pub geometry: Option<RoomGeometry>,
    pub divided: Option<bool>,
    pub max_cats: Option<Option<u32>>,
}

impl RoomPatch {
    /// Patch that writes every editable field of `room`.
    pub fn from_room(room: &Room) -> Self {
        Self {
            label: Some(room.label.clone()),
            geometry: Some(room.geometry),
            divided: Some(room.divided),
            max_cats: Some(room.max_cats),
        }
    }

    pub fn apply_to(&self, room: &mut Room) {
        if let Some(label) = &self.label {
            room.label = label.clone();
        }
        if let Some(geometry) = self.geometry {
            room.geometry = geometry;
        }
        if let Some(divided) = self.divided {
            room.divided = divided;
        }
        if let Some(max_cats) = self.max_cats {
            room.max_cats = max_cats;
        }
    }

    /// Builds a new record; `label` and `geometry` are mandatory.
    pub fn to_new_room(&self, id: &str) -> Option<Room> {
        let label = self.label.as_ref()?;
        let geometry = self.geometry?;
        let mut room = Room::new(id, label.clone(), geometry);
        self.apply_to(&mut room);
        Some(room)
    }
}

/// The shelter's stock layout, used to seed an empty store.
pub fn default_floorplan() -> Vec<Room> {
    let kennel = |id: &str, label: &str, x: i64, y: i64| {
        Room::new(id, label, RoomGeometry::new(x, y, 90, 184))
    };
    vec![
        kennel("room-1-k1", "R1 Kennel 1", 8, 200),
        kennel("room-1-k2", "R1 Kennel 2", 98, 200),
        kennel("room-1-k3", "R1 Kennel 3", 188, 200),
        kennel("room-1-k4", "R1 Kennel 4", 8, 8),
        kennel("room-1-k5", "R1 Kennel 5", 98, 8),
        kennel("room-1-k6", "R1 Kennel 6", 188, 8),
        Room::new("room-2", "Room 2", RoomGeometry::new(370, 248, 280, 136)),
        Room::new("room-3", "Room 3", RoomGeometry::new(658, 104, 184, 280)),
        Room::new("room-4", "Room 4", RoomGeometry::new(300, 8, 272, 152)),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        default_floorplan, snap_to_grid, validate_room_id, Room, RoomGeometry, CANVAS_HEIGHT,
        CANVAS_WIDTH, MIN_ROOM_SIZE,
    };
    use crate::model::cat::DividerSide;
    use crate::model::ModelValidationError;

    #[test]
    fn snap_rounds_half_up_like_the_editor() {
        assert_eq!(snap_to_grid(9), 0);
        assert_eq!(snap_to_grid(10), 20);
        assert_eq!(snap_to_grid(-10), 0);
        assert_eq!(snap_to_grid(-11), -20);
        assert_eq!(snap_to_grid(347), 340);
    }

    #[test]
    fn move_clamps_to_canvas() {
        let geometry = RoomGeometry::new(900, 500, 100, 100);
        let moved = geometry.moved_by(500, 500);
        assert_eq!(moved.x, CANVAS_WIDTH - 100);
        assert_eq!(moved.y, CANVAS_HEIGHT - 100);

        let moved_back = geometry.moved_by(-5000, -5000);
        assert_eq!((moved_back.x, moved_back.y), (0, 0));
        assert!(moved.validate().is_ok());
    }

    #[test]
    fn resize_respects_minimum_and_remaining_canvas() {
        let geometry = RoomGeometry::new(800, 400, 120, 120);
        let shrunk = geometry.resized_by(-500, -500);
        assert_eq!((shrunk.width, shrunk.height), (MIN_ROOM_SIZE, MIN_ROOM_SIZE));

        let grown = geometry.resized_by(1000, 1000);
        assert_eq!(grown.width, CANVAS_WIDTH - 800);
        assert_eq!(grown.height, CANVAS_HEIGHT - 400);
    }

    #[test]
    fn validate_rejects_small_and_out_of_bounds_rooms() {
        let small = Room::new("r1", "Small", RoomGeometry::new(0, 0, 40, 200));
        assert_eq!(small.validate(), Err(ModelValidationError::RoomTooSmall));

        let outside = Room::new("r1", "Outside", RoomGeometry::new(950, 0, 100, 100));
        assert_eq!(
            outside.validate(),
            Err(ModelValidationError::GeometryOutOfBounds)
        );
    }

    #[test]
    fn room_ids_reject_whitespace() {
        assert!(validate_room_id("room-1-k1").is_ok());
        assert!(matches!(
            validate_room_id("room 1"),
            Err(ModelValidationError::InvalidRoomId(_))
        ));
        assert_eq!(validate_room_id("  "), Err(ModelValidationError::EmptyId));
    }

    #[test]
    fn divided_rooms_expose_side_targets_and_default_to_left() {
        let mut room = Room::new("r2", "Room 2", RoomGeometry::new(0, 0, 200, 200));
        assert_eq!(room.drop_target_ids(), vec!["r2".to_string()]);
        assert_eq!(room.effective_side(Some(DividerSide::Right)), None);

        room.divided = true;
        assert_eq!(
            room.drop_target_ids(),
            vec!["r2-left".to_string(), "r2-right".to_string()]
        );
        assert_eq!(room.effective_side(None), Some(DividerSide::Left));
    }

    #[test]
    fn default_floorplan_is_valid() {
        let rooms = default_floorplan();
        assert_eq!(rooms.len(), 9);
        for room in &rooms {
            room.validate().expect("seed room should be valid");
        }
    }

    #[test]
    fn created_rooms_get_prefixed_ids() {
        let room = Room::create("New room", RoomGeometry::new(0, 0, 100, 100));
        assert!(room.id.starts_with("room-"));
        assert!(room.validate().is_ok());
    }
}

//! Placement resolution and capacity enforcement.
//!
//! # Responsibility
//! - Turn a drop target into a validated `(room_id, divider_side)` intent.
//! - Enforce per-room and per-side `max_cats` as a hard cap.
//!
//! # Invariants
//! - Pure: never performs I/O and never mutates the snapshots it reads.
//! - Unassigned targets always resolve, regardless of prior state.
//! - The moving cat never counts against its own destination.

use super::drop_target::DropTarget;
use crate::model::cat::{Cat, CatId, CatPatch, DividerSide};
use crate::model::room::{Room, RoomId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Placement the caller should apply optimistically, then persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementIntent {
    pub cat_id: CatId,
    pub room_id: Option<RoomId>,
    pub divider_side: Option<DividerSide>,
}

impl PlacementIntent {
    /// The null placement. Also the rollback target after a failed write.
    pub fn unassigned(cat_id: impl Into<CatId>) -> Self {
        Self {
            cat_id: cat_id.into(),
            room_id: None,
            divider_side: None,
        }
    }

    /// Store patch carrying only the placement fields.
    pub fn patch(&self) -> CatPatch {
        CatPatch::placement(self.room_id.clone(), self.divider_side)
    }

    /// Applies the intent to the matching cat in `cats`.
    ///
    /// Returns `false` when no cat with `cat_id` is present.
    pub fn apply_to(&self, cats: &mut [Cat]) -> bool {
        match cats.iter_mut().find(|cat| cat.id == self.cat_id) {
            Some(cat) => {
                cat.assign(self.room_id.clone(), self.divider_side);
                true
            }
            None => false,
        }
    }
}

/// Why a drop was refused. Every variant is a silent, non-fatal rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementRejection {
    /// Token names neither a list nor a known room.
    UnknownTarget(String),
    /// Side token on an undivided room, or whole-room token on a divided
    /// room with a capacity limit.
    SideMismatch { room_id: RoomId, divided: bool },
    /// Destination pool already holds `max_cats` other cats.
    RoomFull {
        room_id: RoomId,
        side: Option<DividerSide>,
        max_cats: u32,
    },
}

impl Display for PlacementRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTarget(token) => write!(f, "unknown drop target `{token}`"),
            Self::SideMismatch { room_id, divided } => {
                if *divided {
                    write!(f, "room `{room_id}` is divided; drop onto a side")
                } else {
                    write!(f, "room `{room_id}` is not divided; drop onto the room")
                }
            }
            Self::RoomFull {
                room_id,
                side,
                max_cats,
            } => match side {
                Some(side) => write!(
                    f,
                    "{} side of room `{room_id}` is full ({max_cats} cats)",
                    side.as_str()
                ),
                None => write!(f, "room `{room_id}` is full ({max_cats} cats)"),
            },
        }
    }
}

impl Error for PlacementRejection {}

/// Resolves a drop of `cat_id` onto the token `drop_target_id`.
///
/// # Errors
/// Returns a `PlacementRejection` when the target is unknown, the side form
/// does not match the room's divider state, or the destination is full.
/// Callers must leave their state unchanged on any rejection.
pub fn resolve_placement(
    drop_target_id: &str,
    cat_id: &str,
    cats: &[Cat],
    rooms: &[Room],
) -> Result<PlacementIntent, PlacementRejection> {
    let target = DropTarget::parse(drop_target_id, rooms)
        .ok_or_else(|| PlacementRejection::UnknownTarget(drop_target_id.to_string()))?;
    resolve_target(&target, cat_id, cats, rooms)
}

/// Resolves an already parsed drop target.
pub fn resolve_target(
    target: &DropTarget,
    cat_id: &str,
    cats: &[Cat],
    rooms: &[Room],
) -> Result<PlacementIntent, PlacementRejection> {
    let (room_id, requested_side) = match target {
        DropTarget::Unassigned(_) => return Ok(PlacementIntent::unassigned(cat_id)),
        DropTarget::WholeRoom(room_id) => (room_id, None),
        DropTarget::RoomSide(room_id, side) => (room_id, Some(*side)),
    };

    let room = rooms
        .iter()
        .find(|room| &room.id == room_id)
        .ok_or_else(|| PlacementRejection::UnknownTarget(target.token()))?;

    let side_matches = match requested_side {
        Some(_) => room.divided,
        None => !room.divided || room.max_cats.is_none(),
    };
    if !side_matches {
        return Err(PlacementRejection::SideMismatch {
            room_id: room.id.clone(),
            divided: room.divided,
        });
    }

    if let Some(max_cats) = room.max_cats {
        let pool = room.effective_side(requested_side);
        let occupied = occupancy(room, pool, cats, cat_id);
        if occupied >= max_cats as usize {
            return Err(PlacementRejection::RoomFull {
                room_id: room.id.clone(),
                side: pool,
                max_cats,
            });
        }
    }

    Ok(PlacementIntent {
        cat_id: cat_id.to_string(),
        room_id: Some(room.id.clone()),
        divider_side: requested_side,
    })
}

/// Counts in-custody cats in `room` (and in pool `side` when divided),
/// excluding `excluding_cat_id`.
///
/// Adopted cats keep their last `room_id` but no longer take a slot. For
/// divided rooms a cat without an explicit side counts toward the left pool.
/// For undivided rooms `side` is ignored.
pub fn occupancy(
    room: &Room,
    side: Option<DividerSide>,
    cats: &[Cat],
    excluding_cat_id: &str,
) -> usize {
    let pool = room.effective_side(side);
    cats.iter()
        .filter(|cat| cat.id != excluding_cat_id)
        .filter(|cat| cat.is_in_custody())
        .filter(|cat| cat.room_id.as_deref() == Some(room.id.as_str()))
        .filter(|cat| room.effective_side(cat.divider_side) == pool)
        .count()
}

/// Cats shown inside one room, split by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOccupants<'a> {
    /// Everyone in an undivided room; the left pool of a divided room.
    pub left: Vec<&'a Cat>,
    /// Right pool of a divided room; always empty when undivided.
    pub right: Vec<&'a Cat>,
}

impl RoomOccupants<'_> {
    pub fn total(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

/// Groups the in-custody cats assigned to `room` by the side they occupy.
pub fn room_occupants<'a>(room: &Room, cats: &'a [Cat]) -> RoomOccupants<'a> {
    let mut occupants = RoomOccupants {
        left: Vec::new(),
        right: Vec::new(),
    };
    for cat in cats
        .iter()
        .filter(|cat| cat.is_in_custody())
        .filter(|cat| cat.room_id.as_deref() == Some(room.id.as_str()))
    {
        match room.effective_side(cat.divider_side) {
            Some(DividerSide::Right) => occupants.right.push(cat),
            Some(DividerSide::Left) | None => occupants.left.push(cat),
        }
    }
    occupants
}

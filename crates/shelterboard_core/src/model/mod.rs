//! Domain model for the shelter floorplan.
//!
//! # Responsibility
//! - Define canonical cat and room records shared by store, resolver and
//!   reconciler.
//! - Define partial-update patches used for merge-upserts.
//!
//! # Invariants
//! - `Cat::divider_side` is `None` whenever `Cat::room_id` is `None`.
//! - Room geometry stays inside the canvas and above the minimum size.
//! - `Cat::room_id` is a weak reference; nothing here checks the room exists.

pub mod cat;
pub mod room;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invariant violations detected before a record is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Record id is blank after trim.
    EmptyId,
    /// Cat name is blank after trim.
    EmptyName,
    /// A divider side was set on a cat with no room.
    SideWithoutRoom,
    /// Room id contains characters outside the accepted set.
    InvalidRoomId(String),
    /// Room label is blank after trim.
    EmptyLabel,
    /// Room geometry leaves the canvas.
    GeometryOutOfBounds,
    /// Room width or height is below the minimum usable size.
    RoomTooSmall,
    /// `max_cats` was set to zero.
    ZeroCapacity,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be blank"),
            Self::EmptyName => write!(f, "cat name must not be blank"),
            Self::SideWithoutRoom => {
                write!(f, "divider side must be empty when no room is assigned")
            }
            Self::InvalidRoomId(value) => write!(f, "invalid room id `{value}`"),
            Self::EmptyLabel => write!(f, "room label must not be blank"),
            Self::GeometryOutOfBounds => write!(
                f,
                "room geometry must stay within the {}x{} canvas",
                room::CANVAS_WIDTH,
                room::CANVAS_HEIGHT
            ),
            Self::RoomTooSmall => write!(
                f,
                "room width and height must be at least {}",
                room::MIN_ROOM_SIZE
            ),
            Self::ZeroCapacity => write!(f, "max_cats must be at least 1 when set"),
        }
    }
}

impl Error for ModelValidationError {}

//! Drop-target token parsing.
//!
//! # Responsibility
//! - Turn the string id a drag gesture ended over into a structured target.
//!
//! # Invariants
//! - Reserved list tokens always parse to `Unassigned`.
//! - `RoomSide` and `WholeRoom` are only produced for room ids present in the
//!   room snapshot; anything else parses to `None`.

use crate::model::cat::{CustodyPool, DividerSide};
use crate::model::room::{Room, RoomId};
use once_cell::sync::Lazy;
use regex::Regex;

/// Drop token of the on-site unassigned list.
pub const SHELTER_LIST_TOKEN: &str = "shelter-list";
/// Drop token of the foster list.
pub const FOSTER_LIST_TOKEN: &str = "foster-list";

static SIDE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<room>.+)-(?P<side>left|right)$").expect("valid side suffix regex")
});

/// Structured drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// One of the unassigned lists.
    Unassigned(CustodyPool),
    /// A room as a whole, no side.
    WholeRoom(RoomId),
    /// One half of a room.
    RoomSide(RoomId, DividerSide),
}

impl DropTarget {
    /// Parses `token` against the current room snapshot.
    ///
    /// The `-left`/`-right` suffix form wins when the stripped id names a
    /// known room; otherwise the token is tried as a literal room id.
    pub fn parse(token: &str, rooms: &[Room]) -> Option<Self> {
        match token {
            SHELTER_LIST_TOKEN => return Some(Self::Unassigned(CustodyPool::Shelter)),
            FOSTER_LIST_TOKEN => return Some(Self::Unassigned(CustodyPool::Foster)),
            _ => {}
        }

        let is_known = |id: &str| rooms.iter().any(|room| room.id == id);

        if let Some(captures) = SIDE_SUFFIX_RE.captures(token) {
            let room_id = &captures["room"];
            if is_known(room_id) {
                let side = DividerSide::parse(&captures["side"])?;
                return Some(Self::RoomSide(room_id.to_string(), side));
            }
        }

        if is_known(token) {
            return Some(Self::WholeRoom(token.to_string()));
        }
        None
    }

    /// Token a presentation layer would register for this target.
    pub fn token(&self) -> String {
        match self {
            Self::Unassigned(CustodyPool::Shelter) => SHELTER_LIST_TOKEN.to_string(),
            Self::Unassigned(CustodyPool::Foster) => FOSTER_LIST_TOKEN.to_string(),
            Self::WholeRoom(room_id) => room_id.clone(),
            Self::RoomSide(room_id, side) => format!("{room_id}-{}", side.as_str()),
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        match self {
            Self::Unassigned(_) => None,
            Self::WholeRoom(room_id) | Self::RoomSide(room_id, _) => Some(room_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DropTarget, FOSTER_LIST_TOKEN, SHELTER_LIST_TOKEN};
    use crate::model::cat::{CustodyPool, DividerSide};
    use crate::model::room::{Room, RoomGeometry};

    fn rooms() -> Vec<Room> {
        let geometry = RoomGeometry::new(0, 0, 100, 100);
        vec![
            Room::new("r1", "Room 1", geometry),
            Room::new("room-2", "Room 2", geometry),
            Room::new("annex-left", "Annex", geometry),
        ]
    }

    #[test]
    fn reserved_tokens_parse_to_unassigned_pools() {
        assert_eq!(
            DropTarget::parse(SHELTER_LIST_TOKEN, &[]),
            Some(DropTarget::Unassigned(CustodyPool::Shelter))
        );
        assert_eq!(
            DropTarget::parse(FOSTER_LIST_TOKEN, &[]),
            Some(DropTarget::Unassigned(CustodyPool::Foster))
        );
    }

    #[test]
    fn side_suffix_resolves_to_known_room() {
        assert_eq!(
            DropTarget::parse("room-2-right", &rooms()),
            Some(DropTarget::RoomSide("room-2".to_string(), DividerSide::Right))
        );
        assert_eq!(
            DropTarget::parse("r1-left", &rooms()),
            Some(DropTarget::RoomSide("r1".to_string(), DividerSide::Left))
        );
    }

    #[test]
    fn literal_ids_resolve_even_when_they_look_like_sides() {
        assert_eq!(
            DropTarget::parse("room-2", &rooms()),
            Some(DropTarget::WholeRoom("room-2".to_string()))
        );
        assert_eq!(
            DropTarget::parse("annex-left", &rooms()),
            Some(DropTarget::WholeRoom("annex-left".to_string()))
        );
    }

    #[test]
    fn unknown_tokens_parse_to_none() {
        assert_eq!(DropTarget::parse("room-9", &rooms()), None);
        assert_eq!(DropTarget::parse("room-9-left", &rooms()), None);
        assert_eq!(DropTarget::parse("", &rooms()), None);
    }

    #[test]
    fn token_round_trips_through_parse() {
        let target = DropTarget::RoomSide("room-2".to_string(), DividerSide::Left);
        assert_eq!(DropTarget::parse(&target.token(), &rooms()), Some(target));
    }
}

//! Cat domain model.
//!
//! # Responsibility
//! - Define the cat record imported from the shelter API and placed on the
//!   floorplan.
//! - Provide the merge patch used by ingestion and placement writes.
//!
//! # Invariants
//! - `id` is remote-assigned and never rewritten locally.
//! - `divider_side` is `None` whenever `room_id` is `None`.
//! - Ingestion owns identity/descriptor/custody fields; placement owns
//!   `room_id` and `divider_side` only.

use super::room::RoomId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Stable cat identifier, assigned by the remote shelter API.
pub type CatId = String;

/// Custody state reported by the shelter API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyStatus {
    /// Still the shelter's responsibility (on site or in foster).
    InCustody,
    /// Left the shelter's custody.
    Adopted,
}

impl CustodyStatus {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InCustody => "in_custody",
            Self::Adopted => "adopted",
        }
    }

    /// Parses a storage value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_custody" => Some(Self::InCustody),
            "adopted" => Some(Self::Adopted),
            _ => None,
        }
    }
}

/// Half of a divided room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividerSide {
    Left,
    Right,
}

impl DividerSide {
    /// Stable storage and drop-target suffix value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Which unassigned list a cat belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustodyPool {
    /// On-site cats; these are the ones placed into rooms.
    Shelter,
    /// Cats living with a foster family.
    Foster,
}

/// Canonical cat record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    pub id: CatId,
    pub name: String,
    pub sex: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
    /// Unix epoch seconds.
    pub intake_date: Option<i64>,
    pub photo_url: Option<String>,
    pub status: CustodyStatus,
    pub in_foster: bool,
    /// Weak reference to `Room::id`.
    pub room_id: Option<RoomId>,
    /// Meaningful only when the referenced room is divided.
    pub divider_side: Option<DividerSide>,
    /// Epoch ms of the last ingestion run that touched this record.
    pub last_synced_at: Option<i64>,
    /// Epoch ms, maintained by the store.
    pub updated_at: Option<i64>,
}

impl Cat {
    /// Creates an in-custody, on-site, unassigned cat.
    pub fn new(id: impl Into<CatId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sex: None,
            color: None,
            pattern: None,
            intake_date: None,
            photo_url: None,
            status: CustodyStatus::InCustody,
            in_foster: false,
            room_id: None,
            divider_side: None,
            last_synced_at: None,
            updated_at: None,
        }
    }

    /// Checks record invariants.
    ///
    /// # Errors
    /// - `EmptyId` / `EmptyName` for blank identity fields.
    /// - `SideWithoutRoom` when `divider_side` is set without `room_id`.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.trim().is_empty() {
            return Err(ModelValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyName);
        }
        if self.room_id.is_none() && self.divider_side.is_some() {
            return Err(ModelValidationError::SideWithoutRoom);
        }
        Ok(())
    }

    /// Sets the placement, dropping the side when no room is given.
    pub fn assign(&mut self, room_id: Option<RoomId>, divider_side: Option<DividerSide>) {
        self.divider_side = room_id.as_ref().and(divider_side);
        self.room_id = room_id;
    }

    pub fn is_in_custody(&self) -> bool {
        self.status == CustodyStatus::InCustody
    }

    pub fn pool(&self) -> CustodyPool {
        if self.in_foster {
            CustodyPool::Foster
        } else {
            CustodyPool::Shelter
        }
    }
}

/// Partial cat update with merge semantics.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatPatch {
    pub name: Option<String>,
    pub sex: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub pattern: Option<Option<String>>,
    pub intake_date: Option<Option<i64>>,
    pub photo_url: Option<Option<String>>,
    pub status: Option<CustodyStatus>,
    pub in_foster: Option<bool>,
    pub room_id: Option<Option<RoomId>>,
    pub divider_side: Option<Option<DividerSide>>,
    pub last_synced_at: Option<Option<i64>>,
}

impl CatPatch {
    /// Patch that touches only the placement fields.
    pub fn placement(room_id: Option<RoomId>, divider_side: Option<DividerSide>) -> Self {
        let divider_side = room_id.as_ref().and(divider_side);
        Self {
            room_id: Some(room_id),
            divider_side: Some(divider_side),
            ..Self::default()
        }
    }

    /// Returns whether the patch writes `room_id` or `divider_side`.
    pub fn touches_placement(&self) -> bool {
        self.room_id.is_some() || self.divider_side.is_some()
    }

    /// Merges present fields into `cat`.
    pub fn apply_to(&self, cat: &mut Cat) {
        if let Some(name) = &self.name {
            cat.name = name.clone();
        }
        if let Some(sex) = &self.sex {
            cat.sex = sex.clone();
        }
        if let Some(color) = &self.color {
            cat.color = color.clone();
        }
        if let Some(pattern) = &self.pattern {
            cat.pattern = pattern.clone();
        }
        if let Some(intake_date) = self.intake_date {
            cat.intake_date = intake_date;
        }
        if let Some(photo_url) = &self.photo_url {
            cat.photo_url = photo_url.clone();
        }
        if let Some(status) = self.status {
            cat.status = status;
        }
        if let Some(in_foster) = self.in_foster {
            cat.in_foster = in_foster;
        }
        if let Some(room_id) = &self.room_id {
            cat.room_id = room_id.clone();
            if cat.room_id.is_none() {
                cat.divider_side = None;
            }
        }
        if let Some(divider_side) = self.divider_side {
            cat.divider_side = divider_side;
        }
        if let Some(last_synced_at) = self.last_synced_at {
            cat.last_synced_at = last_synced_at;
        }
    }

    /// Builds a new record from this patch.
    ///
    /// Returns `None` when the mandatory `name` field is absent.
    pub fn to_new_cat(&self, id: &str) -> Option<Cat> {
        let name = self.name.as_ref()?;
        let mut cat = Cat::new(id, name.clone());
        self.apply_to(&mut cat);
        Some(cat)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cat, CatPatch, CustodyPool, DividerSide};
    use crate::model::ModelValidationError;

    #[test]
    fn assign_without_room_drops_side() {
        let mut cat = Cat::new("c1", "Miso");
        cat.assign(None, Some(DividerSide::Right));
        assert_eq!(cat.room_id, None);
        assert_eq!(cat.divider_side, None);
        assert!(cat.validate().is_ok());
    }

    #[test]
    fn validate_rejects_side_without_room() {
        let mut cat = Cat::new("c1", "Miso");
        cat.divider_side = Some(DividerSide::Left);
        assert_eq!(cat.validate(), Err(ModelValidationError::SideWithoutRoom));
    }

    #[test]
    fn clearing_room_through_patch_also_clears_side() {
        let mut cat = Cat::new("c1", "Miso");
        cat.assign(Some("r2".to_string()), Some(DividerSide::Left));

        let patch = CatPatch {
            room_id: Some(None),
            ..CatPatch::default()
        };
        patch.apply_to(&mut cat);

        assert_eq!(cat.room_id, None);
        assert_eq!(cat.divider_side, None);
    }

    #[test]
    fn new_cat_from_patch_requires_name() {
        let patch = CatPatch {
            in_foster: Some(true),
            ..CatPatch::default()
        };
        assert!(patch.to_new_cat("c9").is_none());

        let named = CatPatch {
            name: Some("Tofu".to_string()),
            ..patch
        };
        let cat = named.to_new_cat("c9").expect("named patch should build a cat");
        assert_eq!(cat.pool(), CustodyPool::Foster);
    }
}

//! Assignment reconciliation between cats and rooms.
//!
//! # Responsibility
//! - Detect cats whose `room_id` names a room that no longer exists.
//! - Describe the corrections as one batch for an atomic store write.
//!
//! # Invariants
//! - Pure: reads snapshots, returns a description, performs no I/O.
//! - Idempotent: a consistent `(cats, rooms)` pair yields an empty batch.
//! - Cats pointing at valid rooms are never touched.

use crate::model::cat::{Cat, CatId, CatPatch};
use crate::model::room::{Room, RoomId};
use crate::store::RecordWrite;
use std::collections::HashSet;

/// Clears one dangling room reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCorrection {
    pub cat_id: CatId,
    /// Room id the cat pointed at before the correction.
    pub stale_room_id: RoomId,
}

impl RoomCorrection {
    /// Clears `room_id` and, with it, `divider_side`.
    pub fn patch(&self) -> CatPatch {
        CatPatch::placement(None, None)
    }
}

/// Corrections produced by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionBatch {
    corrections: Vec<RoomCorrection>,
}

impl CorrectionBatch {
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn corrections(&self) -> &[RoomCorrection] {
        &self.corrections
    }

    /// Store writes for `RecordStore::batch_write`.
    pub fn to_writes(&self) -> Vec<RecordWrite> {
        self.corrections
            .iter()
            .map(|correction| RecordWrite::Cat {
                id: correction.cat_id.clone(),
                patch: correction.patch(),
            })
            .collect()
    }

    /// Applies the corrections to an in-memory snapshot.
    pub fn apply_to(&self, cats: &mut [Cat]) {
        for correction in &self.corrections {
            if let Some(cat) = cats.iter_mut().find(|cat| cat.id == correction.cat_id) {
                cat.assign(None, None);
            }
        }
    }
}

/// Room ids that cats may legitimately reference.
pub fn valid_room_ids(rooms: &[Room]) -> HashSet<&str> {
    rooms.iter().map(|room| room.id.as_str()).collect()
}

/// Whether a reactive pass should run for this pair of snapshots.
///
/// Both collections must be non-empty. An empty room set is treated as "not
/// loaded yet", never as "every room was removed".
pub fn should_reconcile(cats: &[Cat], rooms: &[Room]) -> bool {
    !cats.is_empty() && !rooms.is_empty()
}

/// Computes the corrections that clear every dangling `room_id`.
pub fn reconcile_assignments(cats: &[Cat], rooms: &[Room]) -> CorrectionBatch {
    let valid = valid_room_ids(rooms);
    let corrections = cats
        .iter()
        .filter_map(|cat| {
            let room_id = cat.room_id.as_deref()?;
            if valid.contains(room_id) {
                return None;
            }
            Some(RoomCorrection {
                cat_id: cat.id.clone(),
                stale_room_id: room_id.to_string(),
            })
        })
        .collect();
    CorrectionBatch { corrections }
}

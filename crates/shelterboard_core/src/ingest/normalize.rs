//! Remote animal record normalization.
//!
//! # Invariants
//! - Output patches never carry placement fields.
//! - Missing identity or name is a hard error for the whole run.

use super::shelterluv::RemoteAnimal;
use super::IngestError;
use crate::model::cat::{CatId, CatPatch, CustodyStatus};
use serde_json::Value;

const CAT_SPECIES: &str = "cat";

/// Normalized record ready for a merge-upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCat {
    pub id: CatId,
    pub patch: CatPatch,
}

/// Normalizes one remote animal.
///
/// Returns `Ok(None)` for animals of another species.
///
/// # Errors
/// `IngestError::Malformed` when the id or name is missing or blank, or the
/// intake time is not a unix timestamp.
pub fn normalize_animal(
    animal: &RemoteAnimal,
    synced_at_ms: i64,
) -> Result<Option<NormalizedCat>, IngestError> {
    if let Some(species) = animal.species.as_deref() {
        if !species.trim().eq_ignore_ascii_case(CAT_SPECIES) {
            return Ok(None);
        }
    }

    let id = animal
        .internal_id
        .as_ref()
        .and_then(value_to_text)
        .ok_or_else(|| IngestError::Malformed("animal without Internal-ID".to_string()))?;

    let name = non_blank(animal.name.as_deref())
        .ok_or_else(|| IngestError::Malformed(format!("animal `{id}` has no name")))?;

    let intake_date = match animal.last_intake_unix_time.as_ref() {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_unix_seconds(value).ok_or_else(|| {
            IngestError::Malformed(format!("animal `{id}` has invalid intake time `{value}`"))
        })?),
    };

    let patch = CatPatch {
        name: Some(name),
        sex: Some(non_blank(animal.sex.as_deref())),
        color: Some(non_blank(animal.color.as_deref())),
        pattern: Some(non_blank(animal.pattern.as_deref())),
        intake_date: Some(intake_date),
        photo_url: Some(non_blank(animal.cover_photo.as_deref())),
        status: Some(custody_status(animal.status.as_deref())),
        in_foster: Some(animal.in_foster.unwrap_or(false)),
        last_synced_at: Some(Some(synced_at_ms)),
        ..CatPatch::default()
    };

    Ok(Some(NormalizedCat { id, patch }))
}

/// Maps the free-text remote status onto custody state.
pub fn custody_status(remote_status: Option<&str>) -> CustodyStatus {
    let normalized = remote_status.unwrap_or_default().to_ascii_lowercase();
    if normalized.contains("adopted") || normalized.contains("healthy in home") {
        CustodyStatus::Adopted
    } else {
        CustodyStatus::InCustody
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_blank(Some(text)),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_unix_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

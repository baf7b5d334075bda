//! SQL access for the `cats` collection.

use super::{Collection, StoreError, StoreResult};
use crate::model::cat::{Cat, CatPatch, CustodyStatus, DividerSide};
use rusqlite::{params, Connection, Row};

const CAT_SELECT_SQL: &str = "SELECT
    id,
    name,
    sex,
    color,
    pattern,
    intake_date,
    photo_url,
    status,
    in_foster,
    room_id,
    divider_side,
    last_synced_at,
    updated_at
FROM cats";

pub(super) struct SqliteCatRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatRepository<'conn> {
    pub(super) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub(super) fn get_cat(&self, id: &str) -> StoreResult<Option<Cat>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_cat_row(row)?));
        }
        Ok(None)
    }

    /// Lists every cat ordered by name, then id.
    pub(super) fn list_cats(&self) -> StoreResult<Vec<Cat>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAT_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut cats = Vec::new();
        while let Some(row) = rows.next()? {
            cats.push(parse_cat_row(row)?);
        }
        Ok(cats)
    }

    /// Merges `patch` into the stored record, creating it when absent.
    pub(super) fn upsert_merge(&self, id: &str, patch: &CatPatch) -> StoreResult<Cat> {
        let merged = match self.get_cat(id)? {
            Some(mut existing) => {
                patch.apply_to(&mut existing);
                existing
            }
            None => patch
                .to_new_cat(id)
                .ok_or_else(|| StoreError::IncompleteRecord {
                    collection: Collection::Cats,
                    id: id.to_string(),
                })?,
        };
        merged.validate()?;

        self.conn.execute(
            "INSERT INTO cats (
                id,
                name,
                sex,
                color,
                pattern,
                intake_date,
                photo_url,
                status,
                in_foster,
                room_id,
                divider_side,
                last_synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                sex = excluded.sex,
                color = excluded.color,
                pattern = excluded.pattern,
                intake_date = excluded.intake_date,
                photo_url = excluded.photo_url,
                status = excluded.status,
                in_foster = excluded.in_foster,
                room_id = excluded.room_id,
                divider_side = excluded.divider_side,
                last_synced_at = excluded.last_synced_at,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                merged.id.as_str(),
                merged.name.as_str(),
                merged.sex.as_deref(),
                merged.color.as_deref(),
                merged.pattern.as_deref(),
                merged.intake_date,
                merged.photo_url.as_deref(),
                merged.status.as_str(),
                bool_to_int(merged.in_foster),
                merged.room_id.as_deref(),
                merged.divider_side.map(DividerSide::as_str),
                merged.last_synced_at,
            ],
        )?;

        self.get_cat(id)?.ok_or_else(|| StoreError::NotFound {
            collection: Collection::Cats,
            id: id.to_string(),
        })
    }
}

fn parse_cat_row(row: &Row<'_>) -> StoreResult<Cat> {
    let id: String = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = CustodyStatus::parse(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid status `{status_text}` in cats.status"))
    })?;

    let divider_side = match row.get::<_, Option<String>>("divider_side")? {
        Some(value) => Some(DividerSide::parse(&value).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "invalid divider side `{value}` in cats.divider_side"
            ))
        })?),
        None => None,
    };

    let in_foster = int_to_bool(row.get("in_foster")?, "cats.in_foster")?;

    let cat = Cat {
        id,
        name: row.get("name")?,
        sex: row.get("sex")?,
        color: row.get("color")?,
        pattern: row.get("pattern")?,
        intake_date: row.get("intake_date")?,
        photo_url: row.get("photo_url")?,
        status,
        in_foster,
        room_id: row.get("room_id")?,
        divider_side,
        last_synced_at: row.get("last_synced_at")?,
        updated_at: row.get("updated_at")?,
    };
    cat.validate()
        .map_err(|err| StoreError::InvalidData(format!("cat `{}`: {err}", cat.id)))?;
    Ok(cat)
}

pub(super) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(super) fn int_to_bool(value: i64, column: &str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

//! SQL access for the `rooms` collection.

use super::cat_repo::{bool_to_int, int_to_bool};
use super::{Collection, StoreError, StoreResult};
use crate::model::room::{Room, RoomGeometry, RoomPatch};
use rusqlite::{params, Connection, Row};

const ROOM_SELECT_SQL: &str = "SELECT
    id,
    label,
    x,
    y,
    width,
    height,
    divided,
    max_cats,
    updated_at
FROM rooms";

pub(super) struct SqliteRoomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoomRepository<'conn> {
    pub(super) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub(super) fn get_room(&self, id: &str) -> StoreResult<Option<Room>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROOM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_room_row(row)?));
        }
        Ok(None)
    }

    /// Lists every room ordered by id.
    pub(super) fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROOM_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut rooms = Vec::new();
        while let Some(row) = rows.next()? {
            rooms.push(parse_room_row(row)?);
        }
        Ok(rooms)
    }

    pub(super) fn upsert_merge(&self, id: &str, patch: &RoomPatch) -> StoreResult<Room> {
        let merged = match self.get_room(id)? {
            Some(mut existing) => {
                patch.apply_to(&mut existing);
                existing
            }
            None => patch
                .to_new_room(id)
                .ok_or_else(|| StoreError::IncompleteRecord {
                    collection: Collection::Rooms,
                    id: id.to_string(),
                })?,
        };
        merged.validate()?;

        self.conn.execute(
            "INSERT INTO rooms (id, label, x, y, width, height, divided, max_cats)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                label = excluded.label,
                x = excluded.x,
                y = excluded.y,
                width = excluded.width,
                height = excluded.height,
                divided = excluded.divided,
                max_cats = excluded.max_cats,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                merged.id.as_str(),
                merged.label.as_str(),
                merged.geometry.x,
                merged.geometry.y,
                merged.geometry.width,
                merged.geometry.height,
                bool_to_int(merged.divided),
                merged.max_cats,
            ],
        )?;

        self.get_room(id)?.ok_or_else(|| StoreError::NotFound {
            collection: Collection::Rooms,
            id: id.to_string(),
        })
    }

    pub(super) fn delete_room(&self, id: &str) -> StoreResult<()> {
        let changed = self.conn.execute("DELETE FROM rooms WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: Collection::Rooms,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_room_row(row: &Row<'_>) -> StoreResult<Room> {
    let id: String = row.get("id")?;
    let max_cats = match row.get::<_, Option<i64>>("max_cats")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            StoreError::InvalidData(format!("invalid max_cats `{value}` in rooms.max_cats"))
        })?),
        None => None,
    };

    let room = Room {
        label: row.get("label")?,
        geometry: RoomGeometry {
            x: row.get("x")?,
            y: row.get("y")?,
            width: row.get("width")?,
            height: row.get("height")?,
        },
        divided: int_to_bool(row.get("divided")?, "rooms.divided")?,
        max_cats,
        updated_at: row.get("updated_at")?,
        id,
    };
    room.validate()
        .map_err(|err| StoreError::InvalidData(format!("room `{}`: {err}", room.id)))?;
    Ok(room)
}

//! SQLite-backed record store with in-process change subscriptions.
//!
//! # Responsibility
//! - Own the migrated connection and the per-collection subscriber lists.
//! - Publish a fresh snapshot after every committed write.
//!
//! # Invariants
//! - Every public write runs inside one transaction.
//! - Subscribers are notified only after commit, never for rolled-back work.

use super::cat_repo::SqliteCatRepository;
use super::room_repo::SqliteRoomRepository;
use super::subscription::SubscriberList;
use super::{Collection, RecordStore, RecordWrite, StoreResult, Subscription};
use crate::db::{open_db, open_db_in_memory};
use crate::model::cat::{Cat, CatPatch};
use crate::model::room::{Room, RoomPatch};
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Record store over one SQLite connection.
///
/// Single-threaded by construction: the connection and subscriber lists are
/// not `Sync`. Subscriptions themselves may be moved to other threads.
pub struct SqliteRecordStore {
    conn: Connection,
    cat_subscribers: SubscriberList<Cat>,
    room_subscribers: SubscriberList<Room>,
}

impl SqliteRecordStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            cat_subscribers: SubscriberList::new(),
            room_subscribers: SubscriberList::new(),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of live subscribers per collection `(cats, rooms)`.
    pub fn subscriber_counts(&self) -> (usize, usize) {
        (self.cat_subscribers.len(), self.room_subscribers.len())
    }

    fn notify(&self, collection: Collection) {
        match collection {
            Collection::Cats => match SqliteCatRepository::new(&self.conn).list_cats() {
                Ok(cats) => self.cat_subscribers.publish(&cats),
                Err(err) => {
                    error!(
                        "event=snapshot_publish module=store status=error collection=cats error={err}"
                    );
                    self.cat_subscribers.fail(&err.to_string());
                }
            },
            Collection::Rooms => match SqliteRoomRepository::new(&self.conn).list_rooms() {
                Ok(rooms) => self.room_subscribers.publish(&rooms),
                Err(err) => {
                    error!(
                        "event=snapshot_publish module=store status=error collection=rooms error={err}"
                    );
                    self.room_subscribers.fail(&err.to_string());
                }
            },
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn subscribe_cats(&self) -> StoreResult<Subscription<Cat>> {
        let initial = self.list_cats()?;
        Ok(self.cat_subscribers.subscribe(initial))
    }

    fn subscribe_rooms(&self) -> StoreResult<Subscription<Room>> {
        let initial = self.list_rooms()?;
        Ok(self.room_subscribers.subscribe(initial))
    }

    fn list_cats(&self) -> StoreResult<Vec<Cat>> {
        SqliteCatRepository::new(&self.conn).list_cats()
    }

    fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        SqliteRoomRepository::new(&self.conn).list_rooms()
    }

    fn get_cat(&self, id: &str) -> StoreResult<Option<Cat>> {
        SqliteCatRepository::new(&self.conn).get_cat(id)
    }

    fn upsert_cat(&self, id: &str, patch: &CatPatch) -> StoreResult<Cat> {
        let tx = self.conn.unchecked_transaction()?;
        let cat = SqliteCatRepository::new(&tx).upsert_merge(id, patch)?;
        tx.commit()?;
        self.notify(Collection::Cats);
        Ok(cat)
    }

    fn upsert_room(&self, id: &str, patch: &RoomPatch) -> StoreResult<Room> {
        let tx = self.conn.unchecked_transaction()?;
        let room = SqliteRoomRepository::new(&tx).upsert_merge(id, patch)?;
        tx.commit()?;
        self.notify(Collection::Rooms);
        Ok(room)
    }

    fn batch_write(&self, writes: &[RecordWrite]) -> StoreResult<()> {
        let started_at = Instant::now();
        let tx = self.conn.unchecked_transaction()?;
        let mut touched_cats = false;
        let mut touched_rooms = false;

        for write in writes {
            let applied = match write {
                RecordWrite::Cat { id, patch } => {
                    touched_cats = true;
                    SqliteCatRepository::new(&tx).upsert_merge(id, patch).map(|_| ())
                }
                RecordWrite::Room { id, patch } => {
                    touched_rooms = true;
                    SqliteRoomRepository::new(&tx)
                        .upsert_merge(id, patch)
                        .map(|_| ())
                }
            };
            if let Err(err) = applied {
                // Dropping `tx` rolls the whole batch back.
                warn!(
                    "event=batch_write module=store status=error writes={} collection={} duration_ms={} error={}",
                    writes.len(),
                    write.collection().as_str(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        }
        tx.commit()?;

        info!(
            "event=batch_write module=store status=ok writes={} duration_ms={}",
            writes.len(),
            started_at.elapsed().as_millis()
        );
        if touched_cats {
            self.notify(Collection::Cats);
        }
        if touched_rooms {
            self.notify(Collection::Rooms);
        }
        Ok(())
    }

    fn delete_room(&self, id: &str) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        SqliteRoomRepository::new(&tx).delete_room(id)?;
        tx.commit()?;
        info!("event=room_delete module=store status=ok room_id={id}");
        self.notify(Collection::Rooms);
        Ok(())
    }
}

//! Record store contracts and the SQLite-backed implementation.
//!
//! # Responsibility
//! - Hold the `cats` and `rooms` collections.
//! - Offer change subscriptions, merge-upserts and atomic batch writes.
//!
//! # Invariants
//! - Write paths call `validate()` on the merged record before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - A batch either commits completely or leaves the store untouched.
//! - No referential integrity between `cats.room_id` and `rooms.id`.

mod cat_repo;
mod room_repo;
mod sqlite_store;
mod subscription;

pub use sqlite_store::SqliteRecordStore;
pub use subscription::{SnapshotEvent, Subscription};

use crate::db::DbError;
use crate::model::cat::{Cat, CatId, CatPatch};
use crate::model::room::{Room, RoomId, RoomPatch};
use crate::model::ModelValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Name of a record collection, used in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Cats,
    Rooms,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cats => "cats",
            Self::Rooms => "rooms",
        }
    }
}

/// Record store error for persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound {
        collection: Collection,
        id: String,
    },
    /// A merge-upsert would create a record without its mandatory fields.
    IncompleteRecord {
        collection: Collection,
        id: String,
    },
    Validation(ModelValidationError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "{} record not found: {id}", collection.as_str())
            }
            Self::IncompleteRecord { collection, id } => write!(
                f,
                "cannot create {} record `{id}` from a partial update",
                collection.as_str()
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } | Self::IncompleteRecord { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelValidationError> for StoreError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// One entry of an atomic batch write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    Cat { id: CatId, patch: CatPatch },
    Room { id: RoomId, patch: RoomPatch },
}

impl RecordWrite {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Cat { .. } => Collection::Cats,
            Self::Room { .. } => Collection::Rooms,
        }
    }
}

/// Realtime document store consumed by the board and the ingestion job.
pub trait RecordStore {
    /// Subscribes to full cat snapshots. The current snapshot is delivered
    /// immediately; dropping the subscription unsubscribes.
    fn subscribe_cats(&self) -> StoreResult<Subscription<Cat>>;
    /// Subscribes to full room snapshots.
    fn subscribe_rooms(&self) -> StoreResult<Subscription<Room>>;
    fn list_cats(&self) -> StoreResult<Vec<Cat>>;
    fn list_rooms(&self) -> StoreResult<Vec<Room>>;
    fn get_cat(&self, id: &str) -> StoreResult<Option<Cat>>;
    /// Merges `patch` into the cat, creating it when absent.
    fn upsert_cat(&self, id: &str, patch: &CatPatch) -> StoreResult<Cat>;
    /// Merges `patch` into the room, creating it when absent.
    fn upsert_room(&self, id: &str, patch: &RoomPatch) -> StoreResult<Room>;
    /// Applies all writes atomically.
    fn batch_write(&self, writes: &[RecordWrite]) -> StoreResult<()>;
    fn delete_room(&self, id: &str) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn subscribe_cats(&self) -> StoreResult<Subscription<Cat>> {
        (**self).subscribe_cats()
    }

    fn subscribe_rooms(&self) -> StoreResult<Subscription<Room>> {
        (**self).subscribe_rooms()
    }

    fn list_cats(&self) -> StoreResult<Vec<Cat>> {
        (**self).list_cats()
    }

    fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        (**self).list_rooms()
    }

    fn get_cat(&self, id: &str) -> StoreResult<Option<Cat>> {
        (**self).get_cat(id)
    }

    fn upsert_cat(&self, id: &str, patch: &CatPatch) -> StoreResult<Cat> {
        (**self).upsert_cat(id, patch)
    }

    fn upsert_room(&self, id: &str, patch: &RoomPatch) -> StoreResult<Room> {
        (**self).upsert_room(id, patch)
    }

    fn batch_write(&self, writes: &[RecordWrite]) -> StoreResult<()> {
        (**self).batch_write(writes)
    }

    fn delete_room(&self, id: &str) -> StoreResult<()> {
        (**self).delete_room(id)
    }
}

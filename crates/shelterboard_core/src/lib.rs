//! Core domain logic for the shelter floorplan dashboard.
//! This crate is the single source of truth for placement and capacity
//! invariants.

pub mod config;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod placement;
pub mod reconcile;
pub mod service;
pub mod store;

pub use config::{ConfigError, DashboardConfig};
pub use ingest::job::{IngestionJob, SyncReport};
pub use ingest::shelterluv::{AnimalSource, ShelterluvClient};
pub use ingest::IngestError;
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::cat::{Cat, CatId, CatPatch, CustodyPool, CustodyStatus, DividerSide};
pub use model::room::{default_floorplan, Room, RoomGeometry, RoomId, RoomPatch};
pub use model::ModelValidationError;
pub use placement::drop_target::DropTarget;
pub use placement::resolver::{resolve_placement, PlacementIntent, PlacementRejection};
pub use reconcile::{reconcile_assignments, CorrectionBatch, RoomCorrection};
pub use service::board::{Board, BoardError, DropOutcome, ReconcileOutcome, RoomGestureKind};
pub use store::{
    RecordStore, RecordWrite, SnapshotEvent, SqliteRecordStore, StoreError, StoreResult,
    Subscription,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

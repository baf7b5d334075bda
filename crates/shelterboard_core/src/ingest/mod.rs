//! Scheduled import of animal records from the shelter API.
//!
//! # Responsibility
//! - Page through the remote animal listing.
//! - Normalize remote records into cat patches.
//! - Merge-upsert a whole run atomically into the record store.
//!
//! # Invariants
//! - A run writes nothing unless every page fetched and every record
//!   normalized.
//! - Ingestion never writes `room_id` or `divider_side`.
//! - One attempt per scheduled run; no in-run retry.

pub mod job;
pub mod normalize;
pub mod shelterluv;

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors that fail an ingestion run.
#[derive(Debug)]
pub enum IngestError {
    /// Transport failure or non-success HTTP status.
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Response or record does not have the expected shape.
    Malformed(String),
    /// The final batch write failed.
    Store(StoreError),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(status),
                message,
            } => write!(f, "shelter API returned HTTP {status}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "shelter API request failed: {message}"),
            Self::Malformed(message) => write!(f, "malformed shelter API data: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Http { .. } | Self::Malformed(_) => None,
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

//! Ingestion job runner.
//!
//! # Responsibility
//! - Fetch every page, normalize every record, then commit one batch.
//! - Run that on a fixed schedule until asked to stop.
//!
//! # Invariants
//! - Fetch and normalization errors abort the run before any write.
//! - A failed scheduled run is logged; the next tick starts a fresh run.

use super::normalize::{normalize_animal, NormalizedCat};
use super::shelterluv::{AnimalSource, MAX_PAGE_SIZE};
use super::IngestError;
use crate::store::{RecordStore, RecordWrite};
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Default schedule: every 15 minutes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(15 * 60);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Summary of one successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub pages: u32,
    pub fetched: usize,
    pub skipped: usize,
    pub written: usize,
}

/// Imports animals from one source into a record store.
pub struct IngestionJob<S: AnimalSource> {
    source: S,
    page_size: u32,
}

impl<S: AnimalSource> IngestionJob<S> {
    /// Creates a job; `page_size` is clamped to the API maximum.
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one import and commits it as a single atomic batch.
    ///
    /// # Errors
    /// Any fetch, normalization or store error fails the run; when it does,
    /// nothing from this run is written.
    pub fn run_once(&self, store: &dyn RecordStore) -> Result<SyncReport, IngestError> {
        let started_at = Instant::now();
        info!(
            "event=sync_run module=ingest status=start source={}",
            self.source.name()
        );

        match self.fetch_and_write(store) {
            Ok(report) => {
                info!(
                    "event=sync_run module=ingest status=ok source={} pages={} fetched={} skipped={} written={} duration_ms={}",
                    self.source.name(),
                    report.pages,
                    report.fetched,
                    report.skipped,
                    report.written,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=sync_run module=ingest status=error source={} duration_ms={} error={}",
                    self.source.name(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Runs `run_once` every `interval` until `should_stop` is set.
    ///
    /// The first run starts immediately. Returns the number of runs that
    /// completed successfully.
    pub fn run_every(
        &self,
        store: &dyn RecordStore,
        interval: Duration,
        should_stop: &AtomicBool,
    ) -> usize {
        let mut succeeded = 0;
        while !should_stop.load(Ordering::Relaxed) {
            if self.run_once(store).is_ok() {
                succeeded += 1;
            }

            let next_run = Instant::now() + interval;
            while Instant::now() < next_run {
                if should_stop.load(Ordering::Relaxed) {
                    return succeeded;
                }
                let remaining = next_run.saturating_duration_since(Instant::now());
                std::thread::sleep(remaining.min(STOP_POLL_INTERVAL));
            }
        }
        succeeded
    }

    fn fetch_and_write(&self, store: &dyn RecordStore) -> Result<SyncReport, IngestError> {
        let synced_at_ms = epoch_millis();
        let mut report = SyncReport::default();
        let mut normalized: Vec<NormalizedCat> = Vec::new();
        let mut offset = 0_u32;

        loop {
            let page = self.source.fetch_page(offset, self.page_size)?;
            report.pages += 1;
            report.fetched += page.animals.len();

            if page.has_more && page.animals.is_empty() {
                return Err(IngestError::Malformed(format!(
                    "empty page at offset {offset} claims more results"
                )));
            }

            for animal in &page.animals {
                match normalize_animal(animal, synced_at_ms)? {
                    Some(cat) => normalized.push(cat),
                    None => report.skipped += 1,
                }
            }

            if !page.has_more {
                break;
            }
            let page_len = u32::try_from(page.animals.len()).map_err(|_| {
                IngestError::Malformed(format!("page at offset {offset} is too large"))
            })?;
            offset = offset.saturating_add(page_len);
        }

        let writes: Vec<RecordWrite> = normalized
            .into_iter()
            .map(|cat| RecordWrite::Cat {
                id: cat.id,
                patch: cat.patch,
            })
            .collect();
        if !writes.is_empty() {
            store.batch_write(&writes)?;
        }
        report.written = writes.len();
        Ok(report)
    }
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

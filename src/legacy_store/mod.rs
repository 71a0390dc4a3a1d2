//! Extraction of favorites and offline downloads from legacy app databases.
//!
//! A single extraction walks through [`ExtractionPhase`]s: the file is opened
//! read-only, every entity kind is extracted, downloaded offline tracks are
//! grouped by source and the result is assembled into a [`Snapshot`]. Only a
//! file that cannot be opened at all fails the extraction.

mod aggregate;
mod error;
mod extractor;
mod models;
mod opener;
pub mod schema;
mod snapshot;

pub use aggregate::{group_downloaded_by_source, OfflineTracksBySource};
pub use error::{ExtractError, MISSING_INPUT_MESSAGE, UNEXPECTED_MESSAGE, UNREADABLE_MESSAGE};
pub use extractor::{
    extract_entities, normalize_identifier, ExtractedEntities, Extraction, ExtractionWarning,
    WarningReason,
};
pub use models::{FavoriteSource, OfflineTrack, OfflineTrackState};
pub use opener::{LegacyStore, OpenMode, StoreLayout, TableLayout};
pub use schema::EntityKind;
pub use snapshot::{assemble, Snapshot};

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPhase {
    Idle,
    Opening,
    Extracting,
    Assembling,
    Closed,
    Failed,
}

impl ExtractionPhase {
    pub fn can_advance_to(&self, next: ExtractionPhase) -> bool {
        matches!(
            (self, next),
            (ExtractionPhase::Idle, ExtractionPhase::Opening)
                | (ExtractionPhase::Opening, ExtractionPhase::Extracting)
                | (ExtractionPhase::Opening, ExtractionPhase::Failed)
                | (ExtractionPhase::Extracting, ExtractionPhase::Assembling)
                | (ExtractionPhase::Assembling, ExtractionPhase::Closed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExtractionPhase::Closed | ExtractionPhase::Failed)
    }
}

impl fmt::Display for ExtractionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

struct PhaseTracker {
    phase: ExtractionPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        PhaseTracker {
            phase: ExtractionPhase::Idle,
        }
    }

    fn advance(&mut self, next: ExtractionPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal extraction transition {} -> {}",
            self.phase,
            next
        );
        debug!("Extraction phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// A snapshot together with what could not be recovered.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub snapshot: Snapshot,
    pub warnings: Vec<ExtractionWarning>,
    pub open_mode: OpenMode,
}

/// Runs a full extraction over the database file at `path`.
///
/// The store is closed before returning whenever it was opened.
pub fn extract_snapshot(path: &Path) -> Result<ExtractionReport, ExtractError> {
    let mut tracker = PhaseTracker::new();

    tracker.advance(ExtractionPhase::Opening);
    let store = match LegacyStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            tracker.advance(ExtractionPhase::Failed);
            return Err(e);
        }
    };

    tracker.advance(ExtractionPhase::Extracting);
    let mut extracted = extract_entities(&store);
    let warnings = extracted.warnings();

    tracker.advance(ExtractionPhase::Assembling);
    let offline_tracks = std::mem::take(&mut extracted.offline_tracks.records);
    let offline_tracks_by_source = group_downloaded_by_source(offline_tracks);
    let snapshot = assemble(extracted, offline_tracks_by_source, store.schema_version());
    let open_mode = store.mode();

    store.close();
    tracker.advance(ExtractionPhase::Closed);

    info!(
        "Extracted {} artists, {} shows, {} tracks, {} sources, {} sources with downloads ({} warnings)",
        snapshot.artist_uuids.len(),
        snapshot.show_uuids.len(),
        snapshot.track_uuids.len(),
        snapshot.sources.len(),
        snapshot.offline_tracks_by_source.len(),
        warnings.len()
    );

    Ok(ExtractionReport {
        snapshot,
        warnings,
        open_mode,
    })
}

/// Something that turns a database file into a snapshot.
pub trait SnapshotExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractionReport, ExtractError>;
}

/// Extracts snapshots from legacy app SQLite files.
#[derive(Debug, Default, Clone)]
pub struct LegacyDbExtractor;

impl SnapshotExtractor for LegacyDbExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractionReport, ExtractError> {
        extract_snapshot(path)
    }
}

use serde::Serialize;

use super::aggregate::OfflineTracksBySource;
use super::extractor::ExtractedEntities;
use super::models::FavoriteSource;

/// Normalized favorites and downloads recovered from one legacy file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub track_uuids: Vec<String>,
    pub show_uuids: Vec<String>,
    pub artist_uuids: Vec<String>,
    pub sources: Vec<FavoriteSource>,
    pub offline_tracks_by_source: OfflineTracksBySource,
    pub schema_version: i64,
}

impl Snapshot {
    /// True when nothing at all was recovered.
    pub fn is_empty(&self) -> bool {
        self.track_uuids.is_empty()
            && self.show_uuids.is_empty()
            && self.artist_uuids.is_empty()
            && self.sources.is_empty()
            && self.offline_tracks_by_source.is_empty()
    }
}

/// Builds the snapshot out of the extracted favorites and grouped downloads.
pub fn assemble(
    extracted: ExtractedEntities,
    offline_tracks_by_source: OfflineTracksBySource,
    schema_version: i64,
) -> Snapshot {
    Snapshot {
        track_uuids: extracted.track_uuids.records,
        show_uuids: extracted.show_uuids.records,
        artist_uuids: extracted.artist_uuids.records,
        sources: extracted.sources.records,
        offline_tracks_by_source,
        schema_version,
    }
}

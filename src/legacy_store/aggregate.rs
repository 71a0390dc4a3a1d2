use std::collections::BTreeMap;

use super::models::OfflineTrack;

/// Downloaded offline tracks, grouped by their source.
///
/// Ordered by source so that serialization is stable.
pub type OfflineTracksBySource = BTreeMap<String, Vec<OfflineTrack>>;

/// Keeps only fully downloaded tracks and groups them by `source_uuid`.
///
/// Tracks keep their relative order within a group. Sources without any
/// downloaded track get no entry.
pub fn group_downloaded_by_source(
    offline_tracks: impl IntoIterator<Item = OfflineTrack>,
) -> OfflineTracksBySource {
    let mut grouped = OfflineTracksBySource::new();
    for track in offline_tracks
        .into_iter()
        .filter(|track| track.state.is_materialized())
    {
        grouped
            .entry(track.source_uuid.clone())
            .or_default()
            .push(track);
    }
    grouped
}

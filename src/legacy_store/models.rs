use serde::{Serialize, Serializer};

/// Download state of an offline track, as the app stored it.
///
/// The ordinals are part of the file format and of the snapshot output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineTrackState {
    Unknown = 0,
    Queued = 1,
    Downloading = 2,
    Downloaded = 3,
    Deleting = 4,
}

impl OfflineTrackState {
    pub fn from_ordinal(value: i64) -> OfflineTrackState {
        match value {
            1 => OfflineTrackState::Queued,
            2 => OfflineTrackState::Downloading,
            3 => OfflineTrackState::Downloaded,
            4 => OfflineTrackState::Deleting,
            _ => OfflineTrackState::Unknown,
        }
    }

    /// Parses either a state name or a stringified ordinal.
    pub fn from_db_str(value: &str) -> OfflineTrackState {
        let value = value.trim();
        if let Ok(ordinal) = value.parse::<i64>() {
            return Self::from_ordinal(ordinal);
        }
        match value.to_lowercase().as_str() {
            "queued" => OfflineTrackState::Queued,
            "downloading" => OfflineTrackState::Downloading,
            "downloaded" => OfflineTrackState::Downloaded,
            "deleting" => OfflineTrackState::Deleting,
            _ => OfflineTrackState::Unknown,
        }
    }

    pub fn ordinal(&self) -> i64 {
        *self as i64
    }

    /// Whether the media behind this track finished downloading.
    pub fn is_materialized(&self) -> bool {
        *self == OfflineTrackState::Downloaded
    }
}

impl Serialize for OfflineTrackState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.ordinal())
    }
}

/// A favorited source, emitted in full since consumers need its relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteSource {
    pub uuid: String,
    pub created_at: Option<String>,
    pub artist_uuid: Option<String>,
    pub show_uuid: Option<String>,
    pub show_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineTrack {
    pub track_uuid: String,
    pub artist_uuid: Option<String>,
    pub show_uuid: Option<String>,
    pub source_uuid: String,
    pub created_at: Option<String>,
    pub state: OfflineTrackState,
    /// Size in bytes, exactly as stored.
    pub file_size: Option<i64>,
}

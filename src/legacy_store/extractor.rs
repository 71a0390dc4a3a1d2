//! Reads every entity kind out of an opened store.
//!
//! Each kind is extracted on its own: a kind that cannot be read yields an
//! empty list and an [`ExtractionWarning`], and the other kinds carry on.
//! Columns are looked up by name at runtime, so files that lack optional
//! columns or whole tables still produce whatever they do contain.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::models::{FavoriteSource, OfflineTrack, OfflineTrackState};
use super::opener::LegacyStore;
use super::schema::{columns, EntityKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum WarningReason {
    MissingTable,
    MissingKeyColumn,
    ReadFailed(String),
    RowsSkipped,
}

/// A non-fatal problem met while extracting one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    pub entity: EntityKind,
    pub reason: WarningReason,
    pub skipped_rows: usize,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            WarningReason::MissingTable => write!(f, "{}: table is missing", self.entity),
            WarningReason::MissingKeyColumn => write!(
                f,
                "{}: key column {} is missing",
                self.entity,
                self.entity.key_column()
            ),
            WarningReason::ReadFailed(message) => {
                write!(f, "{}: read failed: {}", self.entity, message)
            }
            WarningReason::RowsSkipped => {
                write!(f, "{}: skipped {} undecodable rows", self.entity, self.skipped_rows)
            }
        }
    }
}

/// Records recovered for one entity kind, plus what went wrong if anything.
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub warning: Option<ExtractionWarning>,
}

impl<T> Extraction<T> {
    fn failed(entity: EntityKind, reason: WarningReason) -> Self {
        Extraction {
            records: Vec::new(),
            warning: Some(ExtractionWarning {
                entity,
                reason,
                skipped_rows: 0,
            }),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.warning.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedEntities {
    pub artist_uuids: Extraction<String>,
    pub show_uuids: Extraction<String>,
    pub track_uuids: Extraction<String>,
    pub sources: Extraction<FavoriteSource>,
    pub offline_tracks: Extraction<OfflineTrack>,
}

impl ExtractedEntities {
    pub fn warnings(&self) -> Vec<ExtractionWarning> {
        [
            &self.artist_uuids.warning,
            &self.show_uuids.warning,
            &self.track_uuids.warning,
            &self.sources.warning,
            &self.offline_tracks.warning,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

pub fn extract_entities(store: &LegacyStore) -> ExtractedEntities {
    ExtractedEntities {
        artist_uuids: extract_favorite_uuids(store, EntityKind::Artist),
        show_uuids: extract_favorite_uuids(store, EntityKind::Show),
        track_uuids: extract_favorite_uuids(store, EntityKind::Track),
        sources: extract_sources(store),
        offline_tracks: extract_offline_tracks(store),
    }
}

/// Lowercases an identifier. Idempotent and independent of the host locale.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.to_lowercase()
}

/// Sorted, lowercased primary keys of a favorites table.
///
/// Keys that only differ by case in the file collapse into one entry.
pub fn extract_favorite_uuids(store: &LegacyStore, kind: EntityKind) -> Extraction<String> {
    let key = kind.key_column();
    let mut extraction = extract_with(store, kind, &[key], |row| row.identifier(key));
    extraction.records.sort();
    extraction.records.dedup();
    extraction
}

pub fn extract_sources(store: &LegacyStore) -> Extraction<FavoriteSource> {
    extract_with(
        store,
        EntityKind::Source,
        &[
            columns::UUID,
            columns::CREATED_AT,
            columns::ARTIST_UUID,
            columns::SHOW_UUID,
            columns::SHOW_DATE,
        ],
        |row| {
            Some(FavoriteSource {
                uuid: row.identifier(columns::UUID)?,
                created_at: row.timestamp(columns::CREATED_AT),
                artist_uuid: row.identifier(columns::ARTIST_UUID),
                show_uuid: row.identifier(columns::SHOW_UUID),
                show_date: row.timestamp(columns::SHOW_DATE),
            })
        },
    )
}

pub fn extract_offline_tracks(store: &LegacyStore) -> Extraction<OfflineTrack> {
    extract_with(
        store,
        EntityKind::OfflineTrack,
        &[
            columns::TRACK_UUID,
            columns::ARTIST_UUID,
            columns::SHOW_UUID,
            columns::SOURCE_UUID,
            columns::CREATED_AT,
            columns::STATE,
            columns::FILE_SIZE,
        ],
        |row| {
            Some(OfflineTrack {
                track_uuid: row.identifier(columns::TRACK_UUID)?,
                artist_uuid: row.identifier(columns::ARTIST_UUID),
                show_uuid: row.identifier(columns::SHOW_UUID),
                // Without its source a track can't be grouped.
                source_uuid: row.identifier(columns::SOURCE_UUID)?,
                created_at: row.timestamp(columns::CREATED_AT),
                state: row.state(columns::STATE),
                file_size: row.integer(columns::FILE_SIZE),
            })
        },
    )
}

/// Values of one row, keyed by the requested column names that exist.
struct RowValues {
    values: HashMap<&'static str, Value>,
}

impl RowValues {
    fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    fn identifier(&self, column: &str) -> Option<String> {
        self.get(column).and_then(decode_identifier)
    }

    fn timestamp(&self, column: &str) -> Option<String> {
        self.get(column).and_then(decode_timestamp)
    }

    fn state(&self, column: &str) -> OfflineTrackState {
        self.get(column)
            .map(decode_state)
            .unwrap_or(OfflineTrackState::Unknown)
    }

    fn integer(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(Value::Integer(value)) => Some(*value),
            _ => None,
        }
    }
}

fn extract_with<T, F>(
    store: &LegacyStore,
    kind: EntityKind,
    wanted_columns: &[&'static str],
    decode: F,
) -> Extraction<T>
where
    F: Fn(&RowValues) -> Option<T>,
{
    let extraction = match read_rows(store, kind, wanted_columns) {
        Ok(rows) => {
            let total = rows.len();
            let records: Vec<T> = rows.iter().filter_map(&decode).collect();
            let skipped_rows = total - records.len();
            debug!("Extracted {} of {} {} rows", records.len(), total, kind);
            Extraction {
                records,
                warning: (skipped_rows > 0).then_some(ExtractionWarning {
                    entity: kind,
                    reason: WarningReason::RowsSkipped,
                    skipped_rows,
                }),
            }
        }
        Err(reason) => Extraction::failed(kind, reason),
    };

    if let Some(warning) = &extraction.warning {
        warn!("Partial extraction: {}", warning);
    }
    extraction
}

fn read_rows(
    store: &LegacyStore,
    kind: EntityKind,
    wanted_columns: &[&'static str],
) -> Result<Vec<RowValues>, WarningReason> {
    let table = store
        .layout()
        .table(kind.table_name())
        .ok_or(WarningReason::MissingTable)?;
    if !table.has_column(kind.key_column()) {
        return Err(WarningReason::MissingKeyColumn);
    }

    let present: Vec<&'static str> = wanted_columns
        .iter()
        .copied()
        .filter(|column| table.has_column(column))
        .collect();
    let sql = format!(
        "SELECT {} FROM \"{}\"",
        present
            .iter()
            .map(|column| format!("\"{}\"", column))
            .collect::<Vec<_>>()
            .join(", "),
        table.name.replace('"', "\"\"")
    );

    let read = || -> rusqlite::Result<Vec<RowValues>> {
        let mut stmt = store.connection().prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                let mut values = HashMap::with_capacity(present.len());
                for (index, column) in present.iter().enumerate() {
                    values.insert(*column, row.get::<_, Value>(index)?);
                }
                Ok(RowValues { values })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    };
    read().map_err(|e| WarningReason::ReadFailed(e.to_string()))
}

fn decode_identifier(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) if !text.is_empty() => Some(normalize_identifier(text)),
        Value::Blob(bytes) => Uuid::from_slice(bytes)
            .ok()
            .map(|uuid| uuid.hyphenated().to_string()),
        _ => None,
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Integers are epoch milliseconds, reals are epoch seconds.
fn decode_timestamp(value: &Value) -> Option<String> {
    let timestamp = match value {
        Value::Integer(millis) => DateTime::from_timestamp_millis(*millis)?,
        Value::Real(seconds) if seconds.is_finite() => {
            DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)?
        }
        Value::Text(text) => DateTime::parse_from_rfc3339(text).ok()?.with_timezone(&Utc),
        _ => return None,
    };
    Some(format_timestamp(timestamp))
}

fn decode_state(value: &Value) -> OfflineTrackState {
    match value {
        Value::Integer(ordinal) => OfflineTrackState::from_ordinal(*ordinal),
        Value::Text(text) => OfflineTrackState::from_db_str(text),
        _ => OfflineTrackState::Unknown,
    }
}

//! Legacy database fixtures
//!
//! Every fixture is built in a temp dir and handed to tests as raw bytes,
//! which is what a client uploads.

#![allow(dead_code)]

use super::constants::*;
use anyhow::Result;
use legacy_favorites_extractor::legacy_store::schema::LEGACY_VERSIONED_SCHEMAS;
use legacy_favorites_extractor::sqlite_persistence::VersionedSchema;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn schema_version(version: i64) -> &'static VersionedSchema {
    LEGACY_VERSIONED_SCHEMAS
        .iter()
        .find(|s| s.version == version)
        .expect("Unknown legacy schema version")
}

fn build_db(setup: impl FnOnce(&Connection) -> Result<()>) -> Vec<u8> {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&path).expect("Failed to create fixture database");
        setup(&conn).expect("Failed to populate fixture database");
    }
    std::fs::read(&path).expect("Failed to read fixture database")
}

fn insert_favorites(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO FavoritedArtist (uuid, created_at) VALUES (?1, ?2)",
        params![ARTIST_ID, CREATED_AT_MS],
    )?;
    conn.execute(
        "INSERT INTO FavoritedShow (uuid, created_at, show_date, artist_uuid) VALUES (?1, ?2, ?3, ?4)",
        params![SHOW_ID, CREATED_AT_MS, SHOW_DATE_MS, ARTIST_ID],
    )?;
    conn.execute(
        "INSERT INTO FavoritedSource (uuid, created_at, artist_uuid, show_uuid, show_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![SOURCE_ID, CREATED_AT_MS, ARTIST_ID, SHOW_ID, SHOW_DATE_MS],
    )?;
    conn.execute(
        "INSERT INTO FavoritedTrack (uuid, created_at, artist_uuid, show_uuid, source_uuid)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![TRACK_ID, CREATED_AT_MS, ARTIST_ID, SHOW_ID, SOURCE_ID],
    )?;
    Ok(())
}

fn insert_offline_track(conn: &Connection, track_uuid: &str, state: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO OfflineTrack (track_uuid, artist_uuid, show_uuid, source_uuid, created_at, state, file_size)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            track_uuid,
            ARTIST_ID,
            SHOW_ID,
            SOURCE_ID,
            CREATED_AT_MS,
            state,
            OFFLINE_FILE_SIZE
        ],
    )?;
    Ok(())
}

/// One record of each favorite kind, one downloaded and one queued offline track
pub fn reference_db_bytes() -> Vec<u8> {
    build_db(|conn| {
        schema_version(REFERENCE_SCHEMA_VERSION).create(conn)?;
        insert_favorites(conn)?;
        insert_offline_track(conn, OFFLINE_TRACK_ID, STATE_DOWNLOADED)?;
        insert_offline_track(conn, QUEUED_TRACK_ID, STATE_QUEUED)?;
        Ok(())
    })
}

/// The reference database in WAL journal mode, as mobile apps usually leave it
pub fn wal_mode_db_bytes() -> Vec<u8> {
    build_db(|conn| {
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        schema_version(REFERENCE_SCHEMA_VERSION).create(conn)?;
        insert_favorites(conn)?;
        insert_offline_track(conn, OFFLINE_TRACK_ID, STATE_DOWNLOADED)?;
        Ok(())
    })
}

/// A database written before offline downloads existed
pub fn favorites_only_db_bytes() -> Vec<u8> {
    build_db(|conn| {
        schema_version(FAVORITES_ONLY_SCHEMA_VERSION).create(conn)?;
        insert_favorites(conn)?;
        Ok(())
    })
}

/// A valid SQLite file that has none of the legacy tables
pub fn unrelated_tables_db_bytes() -> Vec<u8> {
    build_db(|conn| {
        conn.execute_batch(
            "CREATE TABLE Playlist (id TEXT PRIMARY KEY, name TEXT);
             INSERT INTO Playlist (id, name) VALUES ('p1', 'Road trip');",
        )?;
        Ok(())
    })
}

/// Mixed-case and duplicated track identifiers, plus sources given in reverse order
pub fn messy_identifiers_db_bytes() -> Vec<u8> {
    build_db(|conn| {
        schema_version(REFERENCE_SCHEMA_VERSION).create(conn)?;
        conn.execute_batch(
            "INSERT INTO FavoritedTrack (uuid, created_at) VALUES ('Track-B', 1);
             INSERT INTO FavoritedTrack (uuid, created_at) VALUES ('TRACK-A', 2);
             INSERT INTO FavoritedTrack (uuid, created_at) VALUES ('track-a', 3);
             INSERT INTO FavoritedArtist (uuid, created_at) VALUES ('ARTIST-Z', 4);
             INSERT INTO FavoritedSource (uuid, created_at) VALUES ('SOURCE-2', 5);
             INSERT INTO FavoritedSource (uuid, created_at) VALUES ('Source-1', 6);",
        )?;
        Ok(())
    })
}

/// Bytes that are not a database at all
pub fn garbage_bytes() -> Vec<u8> {
    b"this is definitely not a legacy database file"
        .iter()
        .cycle()
        .take(4096)
        .copied()
        .collect()
}

/// Writes `bytes` to a file named `name` inside `dir`
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write fixture file");
    path
}

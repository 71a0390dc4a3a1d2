//! Record shapes of the legacy app database.
//!
//! Each entity kind lives in its own table, keyed by a UUID-shaped text
//! identifier. Timestamps are stored as milliseconds since the Unix epoch.
//! `PRAGMA user_version` carries the schema version the app wrote.

use serde::Serialize;
use std::fmt;

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Artist,
    Show,
    Source,
    Track,
    OfflineTrack,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Artist,
        EntityKind::Show,
        EntityKind::Source,
        EntityKind::Track,
        EntityKind::OfflineTrack,
    ];

    pub fn table(&self) -> &'static Table {
        match self {
            EntityKind::Artist => &FAVORITED_ARTIST_TABLE,
            EntityKind::Show => &FAVORITED_SHOW_TABLE,
            EntityKind::Source => &FAVORITED_SOURCE_TABLE,
            EntityKind::Track => &FAVORITED_TRACK_TABLE,
            EntityKind::OfflineTrack => &OFFLINE_TRACK_TABLE,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table().name
    }

    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::OfflineTrack => columns::TRACK_UUID,
            _ => columns::UUID,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

pub mod columns {
    pub const UUID: &str = "uuid";
    pub const TRACK_UUID: &str = "track_uuid";
    pub const CREATED_AT: &str = "created_at";
    pub const SHOW_DATE: &str = "show_date";
    pub const ARTIST_UUID: &str = "artist_uuid";
    pub const SHOW_UUID: &str = "show_uuid";
    pub const SOURCE_UUID: &str = "source_uuid";
    pub const STATE: &str = "state";
    pub const FILE_SIZE: &str = "file_size";
}

// =============================================================================
// Favorites
// =============================================================================

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "FavoritedArtist",
    foreign_column: "uuid",
    on_delete: ForeignKeyOnChange::NoAction,
};

const SHOW_FK: ForeignKey = ForeignKey {
    foreign_table: "FavoritedShow",
    foreign_column: "uuid",
    on_delete: ForeignKeyOnChange::NoAction,
};

const FAVORITED_ARTIST_TABLE: Table = Table {
    name: "FavoritedArtist",
    columns: &[
        sqlite_column!("uuid", &SqlType::Text, is_primary_key = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
};

const FAVORITED_SHOW_TABLE: Table = Table {
    name: "FavoritedShow",
    columns: &[
        sqlite_column!("uuid", &SqlType::Text, is_primary_key = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("show_date", &SqlType::Integer),
        sqlite_column!("artist_uuid", &SqlType::Text, foreign_key = Some(&ARTIST_FK)),
    ],
};

const FAVORITED_SOURCE_TABLE: Table = Table {
    name: "FavoritedSource",
    columns: &[
        sqlite_column!("uuid", &SqlType::Text, is_primary_key = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("artist_uuid", &SqlType::Text, foreign_key = Some(&ARTIST_FK)),
        sqlite_column!("show_uuid", &SqlType::Text, foreign_key = Some(&SHOW_FK)),
        sqlite_column!("show_date", &SqlType::Integer),
    ],
};

// Tracks are favorited without being favorited at the show/source level,
// so their foreign keys carry no constraint.
const FAVORITED_TRACK_TABLE: Table = Table {
    name: "FavoritedTrack",
    columns: &[
        sqlite_column!("uuid", &SqlType::Text, is_primary_key = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("artist_uuid", &SqlType::Text),
        sqlite_column!("show_uuid", &SqlType::Text),
        sqlite_column!("source_uuid", &SqlType::Text),
    ],
};

// =============================================================================
// Offline downloads
// =============================================================================

const OFFLINE_TRACK_TABLE: Table = Table {
    name: "OfflineTrack",
    columns: &[
        sqlite_column!("track_uuid", &SqlType::Text, is_primary_key = true),
        sqlite_column!("artist_uuid", &SqlType::Text),
        sqlite_column!("show_uuid", &SqlType::Text),
        sqlite_column!("source_uuid", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("state", &SqlType::Integer, non_null = true),
        sqlite_column!("file_size", &SqlType::Integer),
    ],
};

/// Schema versions written by released app builds, oldest first.
///
/// Files from before offline downloads existed only carry the favorites
/// tables. The last entry is the full known schema.
pub const LEGACY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 4,
        tables: &[
            FAVORITED_ARTIST_TABLE,
            FAVORITED_SHOW_TABLE,
            FAVORITED_SOURCE_TABLE,
            FAVORITED_TRACK_TABLE,
        ],
    },
    VersionedSchema {
        version: 7,
        tables: &[
            FAVORITED_ARTIST_TABLE,
            FAVORITED_SHOW_TABLE,
            FAVORITED_SOURCE_TABLE,
            FAVORITED_TRACK_TABLE,
            OFFLINE_TRACK_TABLE,
        ],
    },
];

/// The schema every entity kind is declared against.
pub fn full_schema() -> &'static VersionedSchema {
    &LEGACY_VERSIONED_SCHEMAS[LEGACY_VERSIONED_SCHEMAS.len() - 1]
}

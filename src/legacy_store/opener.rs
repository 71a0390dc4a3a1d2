//! Read-only, best-effort opening of a legacy database file.
//!
//! The file is first opened against the full known schema. Files written by
//! older app versions fail that check, so the file is reopened without any
//! declared schema and whatever tables it carries are introspected instead.

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::ExtractError;
use super::schema::full_schema;
use crate::sqlite_persistence::{
    list_tables, read_table_columns, read_user_version, ColumnInfo, VersionedSchema,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// Every declared entity table is present and compatible.
    Full,
    /// Opened without a declared schema; tables may be missing.
    Schemaless,
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableLayout {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// The tables and columns actually present in an opened file.
#[derive(Debug, Clone, Default)]
pub struct StoreLayout {
    tables: HashMap<String, TableLayout>,
}

impl StoreLayout {
    fn introspect(conn: &Connection) -> Result<Self> {
        let mut tables = HashMap::new();
        for name in list_tables(conn)? {
            if let Some(columns) = read_table_columns(conn, &name)? {
                tables.insert(name.to_lowercase(), TableLayout { name, columns });
            }
        }
        Ok(StoreLayout { tables })
    }

    pub fn table(&self, name: &str) -> Option<&TableLayout> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

enum OpenAttempt {
    Opened(LegacyStore),
    SchemaMismatch(String),
    Unreadable(String),
}

/// An open, read-only handle on a legacy database file.
///
/// Owned by a single extraction. [`LegacyStore::close`] consumes the handle;
/// a store dropped without closing releases its connection as well.
pub struct LegacyStore {
    conn: Connection,
    path: PathBuf,
    mode: OpenMode,
    schema_version: i64,
    layout: StoreLayout,
}

impl LegacyStore {
    /// Opens `path` read-only, falling back to a schemaless open.
    ///
    /// Fails with [`ExtractError::Unreadable`] only if neither attempt works.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();

        match std::fs::metadata(path) {
            Ok(metadata) if metadata.len() == 0 => {
                warn!("Refusing to open empty database file {:?}", path);
                return Err(ExtractError::unreadable("file is empty"));
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Cannot stat database file {:?}: {}", path, e);
                return Err(ExtractError::unreadable(e.to_string()));
            }
        }

        match Self::open_with_schema(path, full_schema()) {
            OpenAttempt::Opened(store) => return Ok(store),
            OpenAttempt::SchemaMismatch(reason) => {
                warn!(
                    "Database {:?} does not match the full schema ({}), retrying schemaless",
                    path, reason
                );
            }
            OpenAttempt::Unreadable(reason) => {
                warn!(
                    "Could not open {:?} against the full schema ({}), retrying schemaless",
                    path, reason
                );
            }
        }

        match Self::open_schemaless(path) {
            OpenAttempt::Opened(store) => Ok(store),
            OpenAttempt::SchemaMismatch(reason) | OpenAttempt::Unreadable(reason) => {
                warn!("Database {:?} is unreadable: {}", path, reason);
                Err(ExtractError::unreadable(reason))
            }
        }
    }

    fn open_with_schema(path: &Path, schema: &VersionedSchema) -> OpenAttempt {
        let conn = match open_read_only(path) {
            Ok(conn) => conn,
            Err(e) => return OpenAttempt::Unreadable(format!("{:#}", e)),
        };
        if let Err(e) = schema.validate(&conn) {
            return OpenAttempt::SchemaMismatch(format!("{:#}", e));
        }
        Self::finish_open(conn, path, OpenMode::Full)
    }

    fn open_schemaless(path: &Path) -> OpenAttempt {
        match open_read_only(path) {
            Ok(conn) => Self::finish_open(conn, path, OpenMode::Schemaless),
            Err(e) => OpenAttempt::Unreadable(format!("{:#}", e)),
        }
    }

    fn finish_open(conn: Connection, path: &Path, mode: OpenMode) -> OpenAttempt {
        let schema_version = match read_user_version(&conn) {
            Ok(version) => version,
            Err(e) => return OpenAttempt::Unreadable(format!("{:#}", e)),
        };
        let layout = match StoreLayout::introspect(&conn) {
            Ok(layout) => layout,
            Err(e) => return OpenAttempt::Unreadable(format!("{:#}", e)),
        };

        info!(
            "Opened {:?} ({:?} mode, schema version {}, {} tables)",
            path,
            mode,
            schema_version,
            layout.table_count()
        );

        OpenAttempt::Opened(LegacyStore {
            conn,
            path: path.to_path_buf(),
            mode,
            schema_version,
            layout,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// The schema version the app declared in the file.
    pub fn schema_version(&self) -> i64 {
        self.schema_version
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn close(self) {
        let path = self.path;
        match self.conn.close() {
            Ok(()) => debug!("Closed database {:?}", path),
            // The connection is handed back on failure and released on drop.
            Err((_conn, e)) => warn!("Error closing database {:?}: {}", path, e),
        }
    }
}

/// `file:` URI marking the database immutable, so SQLite never creates
/// `-wal`/`-shm` files next to it, even for WAL-mode databases.
fn immutable_uri(path: &Path) -> String {
    let mut uri = String::from("file:");
    for c in path.to_string_lossy().chars() {
        match c {
            '%' => uri.push_str("%25"),
            '?' => uri.push_str("%3f"),
            '#' => uri.push_str("%23"),
            _ => uri.push(c),
        }
    }
    uri.push_str("?immutable=1");
    uri
}

fn open_read_only(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        immutable_uri(path),
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    // Opening is lazy: the header is only checked on first read.
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
        .context("Failed to read database header")?;
    Ok(conn)
}

use anyhow::{bail, Result};
use rusqlite::{params, Connection};

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Allow unused_mut because the variable is only mutated when optional
            // field assignments are passed to the macro (e.g., `is_primary_key = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
    Numeric,
}

impl SqlType {
    /// Maps a declared column type to its SQLite type affinity.
    ///
    /// Follows the rules of https://www.sqlite.org/datatype3.html#determination_of_column_affinity,
    /// so `VARCHAR(36)` is `Text` and `BIGINT` is `Integer`.
    pub fn from_declared_type(declared: &str) -> SqlType {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            SqlType::Integer
        } else if declared.contains("CHAR") || declared.contains("CLOB") || declared.contains("TEXT")
        {
            SqlType::Text
        } else if declared.is_empty() || declared.contains("BLOB") {
            SqlType::Blob
        } else if declared.contains("REAL") || declared.contains("FLOA") || declared.contains("DOUB")
        {
            SqlType::Real
        } else {
            SqlType::Numeric
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
            SqlType::Numeric => "NUMERIC",
        }
    }
}

pub enum ForeignKeyOnChange {
    NoAction,
    Cascade,
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub foreign_key: Option<&'static ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    match foreign_key.on_delete {
                        ForeignKeyOnChange::NoAction => "NO ACTION",
                        ForeignKeyOnChange::Cascade => "CASCADE",
                    }
                ));
            }
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A column as it actually exists in an opened database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub affinity: SqlType,
    pub is_primary_key: bool,
}

/// Reads the columns of `table_name`, or `None` if the table does not exist.
pub fn read_table_columns(conn: &Connection, table_name: &str) -> Result<Option<Vec<ColumnInfo>>> {
    // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\");", table_name.replace('"', "\"\"")))?;
    let columns = stmt
        .query_map(params![], |row| {
            let declared_type: Option<String> = row.get(2)?;
            Ok(ColumnInfo {
                name: row.get(1)?,
                affinity: SqlType::from_declared_type(declared_type.as_deref().unwrap_or("")),
                is_primary_key: row.get::<_, i32>(5)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        Ok(None)
    } else {
        Ok(Some(columns))
    }
}

/// Names of all user tables in the database.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

pub fn read_user_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

pub struct VersionedSchema {
    pub version: i64,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(&format!("PRAGMA user_version = {}", self.version), [])?;
        Ok(())
    }

    /// Checks that the database holds every table of this schema with at least
    /// the declared columns, with matching affinity and primary key.
    ///
    /// Extra tables and extra columns are accepted: files written by newer
    /// versions of the schema are a superset of the declared shapes.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            let actual_columns = match read_table_columns(conn, table.name)? {
                Some(columns) => columns,
                None => bail!("Table {} is missing", table.name),
            };

            for expected_column in table.columns {
                let actual_column = match actual_columns
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(expected_column.name))
                {
                    Some(column) => column,
                    None => bail!(
                        "Table {} is missing column {}. Found column names: {}",
                        table.name,
                        expected_column.name,
                        actual_columns
                            .iter()
                            .map(|c| c.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                if actual_column.affinity != *expected_column.sql_type {
                    bail!(
                        "Table {} Column {} type mismatch: expected {:?}, got {:?}",
                        table.name,
                        expected_column.name,
                        expected_column.sql_type,
                        actual_column.affinity
                    );
                }
                if actual_column.is_primary_key != expected_column.is_primary_key {
                    bail!(
                        "Table {} Column {} primary key mismatch: expected {}, got {}",
                        table.name,
                        expected_column.name,
                        expected_column.is_primary_key,
                        actual_column.is_primary_key
                    );
                }
            }
        }
        Ok(())
    }
}

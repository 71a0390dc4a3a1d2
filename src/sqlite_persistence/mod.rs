mod versioned_schema;

pub use versioned_schema::{
    list_tables, read_table_columns, read_user_version, Column, ColumnInfo, ForeignKey,
    ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

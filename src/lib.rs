//! Legacy Favorites Extractor Library
//!
//! Reads favorites and offline downloads out of a legacy app database and
//! exposes them as a normalized snapshot, either as a library call or over HTTP.

pub mod config;
pub mod legacy_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use legacy_store::{
    extract_snapshot, ExtractError, ExtractionReport, LegacyDbExtractor, Snapshot,
    SnapshotExtractor,
};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};

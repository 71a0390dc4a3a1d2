//! Shared constants for end-to-end tests
//!
//! When fixture data changes, update only this file.

#![allow(dead_code)]

// ============================================================================
// Reference Legacy Database
// ============================================================================

pub const ARTIST_ID: &str = "artist-123";
pub const SHOW_ID: &str = "show-456";
pub const SOURCE_ID: &str = "source-789";
pub const TRACK_ID: &str = "track-101";
pub const OFFLINE_TRACK_ID: &str = "offline-track-202";

/// A queued (not yet downloaded) track in the reference database
pub const QUEUED_TRACK_ID: &str = "queued-track-303";

/// 2019-05-04T19:00:00Z in epoch milliseconds
pub const CREATED_AT_MS: i64 = 1_556_996_400_000;
pub const CREATED_AT: &str = "2019-05-04T19:00:00.000Z";

/// 2019-05-04T00:00:00Z in epoch milliseconds
pub const SHOW_DATE_MS: i64 = 1_556_928_000_000;
pub const SHOW_DATE: &str = "2019-05-04T00:00:00.000Z";

pub const OFFLINE_FILE_SIZE: i64 = 5_242_880;

/// `state` ordinal of a fully downloaded offline track
pub const STATE_DOWNLOADED: i64 = 3;

/// `state` ordinal of a queued offline track
pub const STATE_QUEUED: i64 = 1;

/// `user_version` written into the reference database
pub const REFERENCE_SCHEMA_VERSION: i64 = 7;

/// `user_version` written into the favorites-only database
pub const FAVORITES_ONLY_SCHEMA_VERSION: i64 = 4;

// ============================================================================
// Public Error Messages
// ============================================================================

pub const MISSING_INPUT_ERROR: &str = "Database file is required";
pub const UNREADABLE_ERROR: &str = "Unable to read database or unsupported version";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Timeout for a single request in tests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

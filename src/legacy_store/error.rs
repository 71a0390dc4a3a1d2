use axum::http::StatusCode;
use thiserror::Error;

pub const MISSING_INPUT_MESSAGE: &str = "Database file is required";
pub const UNREADABLE_MESSAGE: &str = "Unable to read database or unsupported version";
pub const UNEXPECTED_MESSAGE: &str = "Database parsing failed";

/// Failures that stop an extraction.
///
/// Per-entity read problems are not errors: they end up as
/// [`ExtractionWarning`](super::ExtractionWarning)s next to a snapshot.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Database file is required")]
    MissingInput,

    #[error("Unable to read database or unsupported version: {reason}")]
    Unreadable { reason: String },

    #[error("Database parsing failed: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl ExtractError {
    pub fn unreadable(reason: impl Into<String>) -> Self {
        ExtractError::Unreadable {
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ExtractError::MissingInput | ExtractError::Unreadable { .. } => StatusCode::BAD_REQUEST,
            ExtractError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message callers are shown, without internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ExtractError::MissingInput => MISSING_INPUT_MESSAGE,
            ExtractError::Unreadable { .. } => UNREADABLE_MESSAGE,
            ExtractError::Unexpected(_) => UNEXPECTED_MESSAGE,
        }
    }

    /// Diagnostic detail, only exposed for unexpected failures.
    pub fn details(&self) -> Option<String> {
        match self {
            ExtractError::Unexpected(e) => Some(format!("{:#}", e)),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::Unexpected(e.into())
    }
}

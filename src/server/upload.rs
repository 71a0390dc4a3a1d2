//! Upload route: receives a legacy database file and answers with its snapshot.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::state::{GuardedExtractor, ServerState};
use crate::legacy_store::{ExtractError, ExtractionReport, Snapshot};

/// Name of the multipart part carrying the database.
pub const DATABASE_FIELD: &str = "database";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub success: bool,
    pub data: Snapshot,
    pub is_empty: bool,
}

impl From<Snapshot> for ExtractionResponse {
    fn from(snapshot: Snapshot) -> Self {
        ExtractionResponse {
            success: true,
            is_empty: snapshot.is_empty(),
            data: snapshot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ExtractError> for ErrorResponse {
    fn from(e: &ExtractError) -> Self {
        ErrorResponse {
            error: e.public_message().to_string(),
            details: e.details(),
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

enum UploadBody {
    Database(Vec<u8>),
    Missing,
    TooLarge,
}

/// Picks the `database` part, or else the first part that carries a file name.
async fn read_database_part(multipart: &mut Multipart) -> UploadBody {
    let mut fallback: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return UploadBody::TooLarge,
            Err(e) => {
                warn!("Failed to read multipart body: {}", e);
                break;
            }
        };

        let is_database = field.name() == Some(DATABASE_FIELD);
        let is_file = field.file_name().is_some();
        if !is_database && (!is_file || fallback.is_some()) {
            continue;
        }

        match field.bytes().await {
            Ok(bytes) if is_database => return UploadBody::Database(bytes.to_vec()),
            Ok(bytes) => fallback = Some(bytes.to_vec()),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return UploadBody::TooLarge,
            Err(e) => {
                warn!("Failed to read file data: {}", e);
                break;
            }
        }
    }

    match fallback {
        Some(data) => UploadBody::Database(data),
        None => UploadBody::Missing,
    }
}

/// File name of the staged upload inside its staging directory.
const STAGED_FILE_NAME: &str = "upload.db";

/// Stages `data` in its own temp dir and extracts it.
///
/// The whole dir is removed on every path, along with any file SQLite
/// may have created next to the database.
fn extract_upload(
    extractor: GuardedExtractor,
    upload_dir: PathBuf,
    data: Vec<u8>,
) -> Result<ExtractionReport, ExtractError> {
    let staging_dir = tempfile::Builder::new()
        .prefix("legacy-upload-")
        .tempdir_in(&upload_dir)?;
    let path = staging_dir.path().join(STAGED_FILE_NAME);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(&data)?;
    file.flush()?;
    drop(file);
    debug!("Staged upload at {:?}", path);

    extractor.extract(&path)
}

/// POST /upload - Extract a snapshot from a legacy database (multipart/form-data)
pub async fn upload_database(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload_id = Uuid::new_v4();
    let span = info_span!("upload", id = %upload_id);

    async move {
        let mut multipart = match multipart {
            Ok(multipart) => multipart,
            Err(e) => {
                warn!("Rejected upload without multipart body: {}", e);
                return ExtractError::MissingInput.into_response();
            }
        };

        let data = match read_database_part(&mut multipart).await {
            UploadBody::Database(data) => data,
            UploadBody::Missing => return ExtractError::MissingInput.into_response(),
            UploadBody::TooLarge => {
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(ErrorResponse {
                        error: "Database file is too large".to_string(),
                        details: None,
                    }),
                )
                    .into_response()
            }
        };

        info!("Received database upload ({:#})", byte_unit::Byte::from(data.len()));

        let extractor = state.extractor.clone();
        let upload_dir = state.config.upload_dir();
        let current_span = tracing::Span::current();
        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| extract_upload(extractor, upload_dir, data))
        })
        .await
        .unwrap_or_else(|e| Err(ExtractError::Unexpected(anyhow::anyhow!("Extraction task failed: {}", e))));

        match result {
            Ok(report) => {
                for warning in &report.warnings {
                    warn!("Extraction warning: {}", warning);
                }
                Json(ExtractionResponse::from(report.snapshot)).into_response()
            }
            Err(e) => {
                match &e {
                    ExtractError::Unexpected(_) => error!("Upload failed: {}", e),
                    _ => info!("Upload rejected: {}", e),
                }
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

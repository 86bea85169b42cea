//! Upload batch command
//!
//! Stages an uploaded batch file under the upload directory and runs it
//! through the [`BatchOrchestrator`]. The staged file is left in place.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::ingest::{BatchError, BatchOrchestrator, ProductOutcome};

/// Multipart field carrying the batch file
pub const UPLOAD_FIELD: &str = "csvFile";
/// Also accepted, for generic upload clients
pub const UPLOAD_FIELD_ALIAS: &str = "file";
/// Staged name when the client sends none we can use
pub const DEFAULT_UPLOAD_NAME: &str = "upload.csv";

#[derive(Debug, Clone)]
pub struct UploadBatchCommand {
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatchResponse {
    pub tracking_id: String,
    pub products: Vec<ProductOutcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadBatchError {
    #[error("A CSV file is required in the 'csvFile' field")]
    FileRequired,
    #[error("Upload request rejected: {0}")]
    Rejected(#[from] axum::extract::multipart::MultipartRejection),
    #[error("Failed to read upload: {0}")]
    Transport(#[from] axum::extract::multipart::MultipartError),
    #[error("Failed to stage upload at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to process batch: {0}")]
    Batch(#[from] BatchError),
}

impl UploadBatchCommand {
    /// File name to stage under, with any directory components dropped
    pub fn staged_name(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|raw| raw.rsplit(|c: char| c == '/' || c == '\\').next())
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string()
    }
}

async fn stage(upload_dir: &Path, command: &UploadBatchCommand) -> Result<PathBuf, UploadBatchError> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|source| UploadBatchError::Staging {
            path: upload_dir.to_path_buf(),
            source,
        })?;

    let path = upload_dir.join(command.staged_name());
    tokio::fs::write(&path, &command.content)
        .await
        .map_err(|source| UploadBatchError::Staging {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

#[tracing::instrument(skip(orchestrator, command), fields(file_name = ?command.file_name, bytes = command.content.len()))]
pub async fn handle(
    orchestrator: &BatchOrchestrator,
    upload_dir: &Path,
    command: UploadBatchCommand,
) -> Result<UploadBatchResponse, UploadBatchError> {
    let staged = stage(upload_dir, &command).await?;
    tracing::debug!(path = %staged.display(), "Upload staged");

    let report = orchestrator.submit(&staged).await?;

    Ok(UploadBatchResponse {
        tracking_id: report.tracking_id,
        products: report.products,
    })
}

//! `POST /upload`: multipart file storage under the uploads directory.
//!
//! The form carries a `file` part and an optional `folder` text part. Files are
//! written to `<uploads.dir>/<folder>/<field>-<unix_millis>-<random><.ext>` and
//! served back under `/uploads`.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medtour_api::ApiError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::server::AppState;

pub const DEFAULT_FOLDER: &str = "misc";
const FILE_FIELD: &str = "file";
const FOLDER_FIELD: &str = "folder";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File not uploaded correctly.")]
    MissingFile,

    #[error("Invalid folder name: {0}")]
    InvalidFolder(String),

    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Failed to create upload directory")]
    CreateDir(#[source] std::io::Error),

    #[error("Failed to save uploaded file")]
    Write(#[source] std::io::Error),

    #[error("Upload failed")]
    Multipart(#[from] MultipartError),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match &err {
            UploadError::MissingFile | UploadError::InvalidFolder(_) => {
                ApiError::bad_request(err.to_string())
            }
            UploadError::TooLarge { .. } => ApiError::payload_too_large(err.to_string()),
            UploadError::Multipart(source)
                if source.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                ApiError::payload_too_large(err.to_string())
            }
            UploadError::CreateDir(source) | UploadError::Write(source) => {
                tracing::error!(error = %source, "upload io failure");
                ApiError::internal(err.to_string())
            }
            UploadError::Multipart(source) if source.status().is_client_error() => {
                tracing::debug!(error = %source, "malformed multipart body");
                ApiError::bad_request(err.to_string())
            }
            UploadError::Multipart(source) => {
                tracing::error!(error = %source, "multipart read failure");
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

pub fn is_valid_folder(folder: &str) -> bool {
    !folder.is_empty()
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `.ext` from the client file name, or empty when absent or not alphanumeric.
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn stored_file_name(field: &str, extension: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{field}-{millis}-{suffix}{extension}")
}

struct ReceivedFile {
    extension: String,
    bytes: Vec<u8>,
}

pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let limit = state.config.uploads.max_file_bytes;
    let mut folder: Option<String> = None;
    let mut file: Option<ReceivedFile> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let extension = extension_of(field.file_name());
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if bytes.len() + chunk.len() > limit {
                        return Err(UploadError::TooLarge { limit });
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some(ReceivedFile { extension, bytes });
            }
            Some(FOLDER_FIELD) => {
                let value = field.text().await?;
                let value = value.trim();
                if !value.is_empty() {
                    folder = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    let folder = folder.unwrap_or_else(|| DEFAULT_FOLDER.to_string());
    if !is_valid_folder(&folder) {
        return Err(UploadError::InvalidFolder(folder));
    }

    let dir = state.config.uploads.dir.join(&folder);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(UploadError::CreateDir)?;

    let file_name = stored_file_name(FILE_FIELD, &file.extension);
    tokio::fs::write(dir.join(&file_name), &file.bytes)
        .await
        .map_err(UploadError::Write)?;

    tracing::info!(%folder, file = %file_name, size = file.bytes.len(), "file uploaded");
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url: format!("/uploads/{folder}/{file_name}"),
    }))
}

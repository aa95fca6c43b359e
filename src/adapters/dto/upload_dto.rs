use serde::Serialize;

use crate::{
    application::drive_session::UploadStatus,
    domain::models::{
        file::{FileIdentity, QueuedFile},
        file_type::format_file_size,
    },
};

#[derive(Debug, Serialize)]
pub struct QueuedFileResponse {
    pub name: String,
    pub size: u64,
    #[serde(rename = "formattedSize")]
    pub formatted_size: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

impl From<&QueuedFile> for QueuedFileResponse {
    fn from(file: &QueuedFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size(),
            formatted_size: format_file_size(file.size()),
            content_type: file.content_type.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub files: Vec<QueuedFileResponse>,
    #[serde(rename = "totalBytes")]
    pub total_bytes: u64,
}

impl QueueResponse {
    pub fn from_entries(entries: &[QueuedFile]) -> Self {
        Self {
            files: entries.iter().map(QueuedFileResponse::from).collect(),
            total_bytes: entries.iter().map(QueuedFile::size).sum(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddFilesResponse {
    pub added: Vec<FileIdentity>,
    pub queue: QueueResponse,
}

#[derive(Debug, Serialize)]
pub struct UploadStatusResponse {
    #[serde(flatten)]
    pub status: UploadStatus,
    /// Summary line for the finished pass.
    pub notification: Option<String>,
}

impl From<UploadStatus> for UploadStatusResponse {
    fn from(status: UploadStatus) -> Self {
        Self {
            notification: status.summary.as_ref().map(|s| s.notification()),
            status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

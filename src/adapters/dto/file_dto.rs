use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    application::{
        catalog::CatalogEntry,
        drive_session::{DeleteOutcome, FileLink, FileListing, FilePreview},
    },
    domain::models::file_type::{format_file_size, FileCategory, PreviewKind},
};

pub const SHARE_MESSAGE: &str = "Shareable link copied to clipboard!";
pub const DOWNLOAD_MESSAGE: &str = "Download link copied to clipboard!";
pub const DELETE_MESSAGE: &str = "File deleted successfully!";

#[derive(Debug, Deserialize, Default)]
pub struct ListFilesQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteFileQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub size: u64,
    #[serde(rename = "formattedSize")]
    pub formatted_size: String,
    pub category: FileCategory,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

impl From<CatalogEntry> for FileResponse {
    fn from(entry: CatalogEntry) -> Self {
        let record = entry.record;
        Self {
            formatted_size: format_file_size(record.size),
            id: record.id,
            name: record.name,
            content_type: record.content_type,
            size: record.size,
            category: entry.category,
            uploaded_at: record.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
    pub message: Option<String>,
}

impl From<FileListing> for FileListResponse {
    fn from(listing: FileListing) -> Self {
        Self {
            files: listing.files.into_iter().map(FileResponse::from).collect(),
            message: listing.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub id: String,
    pub name: String,
    pub url: String,
    pub kind: PreviewKind,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(rename = "formattedSize")]
    pub formatted_size: String,
}

impl From<FilePreview> for PreviewResponse {
    fn from(preview: FilePreview) -> Self {
        Self {
            formatted_size: format_file_size(preview.record.size),
            id: preview.record.id,
            name: preview.record.name,
            content_type: preview.record.content_type,
            url: preview.url,
            kind: preview.kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: Option<u64>,
    pub message: String,
}

impl LinkResponse {
    pub fn new(link: FileLink, message: &str) -> Self {
        Self {
            url: link.url,
            expires_in: link.expires_in.map(|d| d.as_secs()),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    pub orphaned: bool,
    pub message: String,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            id: outcome.id,
            orphaned: outcome.orphaned,
            message: DELETE_MESSAGE.to_string(),
        }
    }
}

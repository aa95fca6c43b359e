use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::file_type::content_type_for;

/// Identity of a queued file. Two selections with the same name and byte size
/// are the same file as far as the pending queue is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileIdentity {
    pub name: String,
    pub size: u64,
}

/// A file picked by the user and waiting in the pending queue.
#[derive(Debug, Clone)]
pub struct QueuedFile {
    pub name: String,
    pub content_type: String,
    pub content: Bytes,
}

impl QueuedFile {
    /// Builds a queue entry. When the platform did not supply a content type
    /// (or supplied an empty one) it is derived from the file extension.
    pub fn new(name: impl Into<String>, content: Bytes, content_type: Option<String>) -> Self {
        let name = name.into();
        let content_type = content_type
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| content_type_for(&name));

        Self {
            name,
            content_type,
            content,
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn identity(&self) -> FileIdentity {
        FileIdentity {
            name: self.name.clone(),
            size: self.size(),
        }
    }
}

/// An object as reported by the blob storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    pub path: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "downloadUrl")]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_content_type_is_derived_from_extension() {
        let file = QueuedFile::new("photo.PNG", Bytes::from_static(b"abc"), None);
        assert_eq!(file.content_type, "image/png");

        let blank = QueuedFile::new("notes.txt", Bytes::new(), Some("  ".to_string()));
        assert_eq!(blank.content_type, "text/plain");
    }

    #[test]
    fn platform_content_type_wins() {
        let file = QueuedFile::new(
            "data.bin",
            Bytes::from_static(b"x"),
            Some("application/x-custom".to_string()),
        );
        assert_eq!(file.content_type, "application/x-custom");
    }

    #[test]
    fn identity_is_name_and_size() {
        let file = QueuedFile::new("a.png", Bytes::from(vec![0u8; 1000]), None);
        assert_eq!(
            file.identity(),
            FileIdentity {
                name: "a.png".to_string(),
                size: 1000
            }
        );
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{
    file::StoredObject, file_record::FileRecord, user::UserIdentity,
};

/// Fields of a file record before the metadata store assigned it an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecordDTO {
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub path: String,
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecordDTO {
    pub fn for_upload(
        owner: &UserIdentity,
        name: &str,
        content_type: &str,
        size: u64,
        object: &StoredObject,
    ) -> Self {
        Self {
            owner_id: owner.id.clone(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            size,
            path: object.path.clone(),
            download_url: object.download_url.clone(),
            uploaded_at: Utc::now(),
        }
    }

    pub fn into_record(self, id: String) -> FileRecord {
        FileRecord {
            id,
            owner_id: self.owner_id,
            name: self.name,
            content_type: self.content_type,
            size: self.size,
            path: self.path,
            download_url: self.download_url,
            uploaded_at: self.uploaded_at,
        }
    }
}

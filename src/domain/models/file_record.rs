use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::file::StoredObject;
use crate::domain::models::file_type::content_type_for;

/// Metadata describing one uploaded object. Owned by the metadata store (or,
/// without one, synthesized from the storage listing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub size: u64,
    pub path: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: Option<String>,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Record for a storage object when there is no metadata store. The object
    /// name is unique under the owner's prefix and doubles as the id.
    pub fn from_stored_object(owner_id: &str, object: StoredObject) -> Self {
        let content_type = object
            .content_type
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| content_type_for(&object.name));

        Self {
            id: object.name.clone(),
            owner_id: owner_id.to_string(),
            name: object.name,
            content_type,
            size: object.size,
            path: object.path,
            download_url: object.download_url,
            uploaded_at: object.created_at.unwrap_or_else(Utc::now),
        }
    }
}

use async_trait::async_trait;

use crate::{
    application::{dto::metadata_dto::FileRecordDTO, error::ApplicationError},
    domain::models::{file_record::FileRecord, user::UserIdentity},
};

#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Creates the record for `(owner, path)`, or replaces it when the same
    /// path is uploaded again. The stored id stays the same on replace.
    async fn save_file_record(&self, record: FileRecordDTO)
        -> Result<FileRecord, ApplicationError>;
    /// Records of `owner_id`, newest first.
    async fn list_file_records(&self, owner_id: &str) -> Result<Vec<FileRecord>, ApplicationError>;
    async fn delete_file_record(&self, id: &str) -> Result<(), ApplicationError>;
    async fn create_user_profile(&self, user: &UserIdentity) -> Result<(), ApplicationError>;
}

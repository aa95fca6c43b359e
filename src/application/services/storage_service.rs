use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::{
    application::error::ApplicationError,
    domain::{config::local::Provider, models::file::StoredObject},
};

/// One tick of an in-flight transfer.
#[derive(Debug, Clone)]
pub enum TransferEvent {
    /// Bytes of the current object handed to the collaborator so far.
    Progress { bytes_transferred: u64 },
    Completed(StoredObject),
}

/// Finite stream of progress ticks ending with exactly one `Completed` event or
/// one error. Dropping the stream aborts the transfer.
pub type TransferStream = BoxStream<'static, Result<TransferEvent, ApplicationError>>;

#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    pub overwrite: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

#[async_trait]
pub trait StorageService: Send + Sync {
    fn provider(&self) -> Provider;

    /// Storage path of `file_name` for `owner_id`.
    fn object_path(&self, owner_id: &str, file_name: &str) -> String;

    /// Prefix under which all objects of `owner_id` live.
    fn owner_prefix(&self, owner_id: &str) -> String;

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, ApplicationError>;

    fn upload_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        options: UploadOptions,
    ) -> TransferStream;

    async fn public_reference(&self, path: &str) -> Result<String, ApplicationError>;

    async fn signed_reference(&self, path: &str, ttl: Duration)
        -> Result<String, ApplicationError>;

    async fn delete_objects(&self, paths: &[String]) -> Result<(), ApplicationError>;
}

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::{
        dto::metadata_dto::FileRecordDTO,
        error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
        services::storage_service::{StorageService, TransferEvent, UploadOptions},
        upload::progress::ProgressTracker,
    },
    domain::models::{
        file::{QueuedFile, StoredObject},
        upload::{FileFailure, UploadProgress, UploadSummary},
        user::UserIdentity,
    },
};

enum EntryOutcome {
    Uploaded(StoredObject),
    Failed(ApplicationError),
    Cancelled,
}

/// Uploads a snapshot of the pending queue one file at a time. Entry `i + 1`
/// is not started before entry `i` reached success or failure, and a failing
/// entry never aborts the pass.
pub struct UploadDriver {
    storage: Arc<dyn StorageService>,
    recorder: Option<Arc<dyn MetadataRepository>>,
}

impl UploadDriver {
    pub fn new(
        storage: Arc<dyn StorageService>,
        recorder: Option<Arc<dyn MetadataRepository>>,
    ) -> Self {
        Self { storage, recorder }
    }

    pub async fn run<F>(
        &self,
        session_id: Uuid,
        owner: &UserIdentity,
        files: &[QueuedFile],
        cancel: &CancellationToken,
        on_progress: F,
    ) -> UploadSummary
    where
        F: Fn(UploadProgress),
    {
        let mut tracker = ProgressTracker::new(
            session_id,
            files.iter().map(|f| (f.name.clone(), f.size())),
        );
        let mut summary = UploadSummary::new(session_id);

        info!(
            session_id = %session_id,
            files = files.len(),
            total_bytes = files.iter().map(QueuedFile::size).sum::<u64>(),
            "Starting upload session"
        );

        for (index, file) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                summary.skipped.push(file.name.clone());
                continue;
            }

            on_progress(tracker.begin(index));

            match self.transfer(index, file, owner, cancel, &mut tracker, &on_progress).await {
                EntryOutcome::Uploaded(object) => match self.record(owner, file, &object).await {
                    Ok(()) => {
                        info!(session_id = %session_id, name = %file.name, path = %object.path, "File uploaded");
                        summary.succeeded.push(file.name.clone());
                    }
                    Err(e) => {
                        warn!(session_id = %session_id, name = %file.name, "Failed to record file metadata: {}", e);
                        summary.failed.push(FileFailure {
                            name: file.name.clone(),
                            message: e.to_string(),
                        });
                    }
                },
                EntryOutcome::Failed(e) => {
                    warn!(session_id = %session_id, name = %file.name, "Error uploading file: {}", e);
                    summary.failed.push(FileFailure {
                        name: file.name.clone(),
                        message: e.to_string(),
                    });
                }
                EntryOutcome::Cancelled => {
                    info!(session_id = %session_id, name = %file.name, "Upload cancelled mid-transfer");
                    summary.cancelled = true;
                    summary.skipped.push(file.name.clone());
                }
            }

            on_progress(tracker.finish(index));
        }

        info!(session_id = %session_id, "{}", summary.notification());
        summary
    }

    async fn transfer<F>(
        &self,
        index: usize,
        file: &QueuedFile,
        owner: &UserIdentity,
        cancel: &CancellationToken,
        tracker: &mut ProgressTracker,
        on_progress: &F,
    ) -> EntryOutcome
    where
        F: Fn(UploadProgress),
    {
        let path = self.storage.object_path(&owner.id, &file.name);
        let mut transfer = self.storage.upload_object(
            &path,
            file.content.clone(),
            &file.content_type,
            UploadOptions { overwrite: true },
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return EntryOutcome::Cancelled,
                event = transfer.next() => match event {
                    Some(Ok(TransferEvent::Progress { bytes_transferred })) => {
                        on_progress(tracker.record(index, bytes_transferred));
                    }
                    Some(Ok(TransferEvent::Completed(object))) => {
                        on_progress(tracker.record(index, file.size()));
                        return EntryOutcome::Uploaded(object);
                    }
                    Some(Err(e)) => return EntryOutcome::Failed(e),
                    None => {
                        return EntryOutcome::Failed(ApplicationError::InternalError(
                            "Transfer ended without completing".to_string(),
                        ))
                    }
                },
            }
        }
    }

    async fn record(
        &self,
        owner: &UserIdentity,
        file: &QueuedFile,
        object: &StoredObject,
    ) -> Result<(), ApplicationError> {
        let Some(recorder) = &self.recorder else {
            return Ok(());
        };

        let dto = FileRecordDTO::for_upload(owner, &file.name, &file.content_type, file.size(), object);
        recorder.save_file_record(dto).await?;
        Ok(())
    }
}

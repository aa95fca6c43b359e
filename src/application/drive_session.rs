use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::{
        catalog::{CatalogEntry, FileCatalog, FileQuery, NO_FILES_MESSAGE, NO_MATCHES_MESSAGE},
        error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
        services::{auth_service::AuthService, storage_service::StorageService},
        upload::{driver::UploadDriver, progress::ProgressTracker, queue::PendingQueue},
    },
    domain::models::{
        file::{FileIdentity, QueuedFile},
        file_record::FileRecord,
        file_type::PreviewKind,
        upload::{UploadProgress, UploadSummary},
        user::{SignUpOutcome, UserIdentity},
    },
};

pub const LOGIN_TO_UPLOAD: &str = "Please login to upload files";
pub const LOGIN_TO_VIEW: &str = "Please login to view your files";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadStatus {
    pub state: UploadState,
    pub progress: Option<UploadProgress>,
    pub summary: Option<UploadSummary>,
}

impl UploadStatus {
    fn idle() -> Self {
        Self {
            state: UploadState::Idle,
            progress: None,
            summary: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileListing {
    pub files: Vec<CatalogEntry>,
    /// Empty-state message for the grid, when there is nothing to show.
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FilePreview {
    pub record: FileRecord,
    pub url: String,
    pub kind: PreviewKind,
}

#[derive(Debug, Clone)]
pub struct FileLink {
    pub url: String,
    pub expires_in: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub id: String,
    /// The record is gone but its bytes could not be removed; they are
    /// retried on the next catalog refresh.
    pub orphaned: bool,
}

/// The file-manager screen's state and the operations bound to it: pending
/// queue, upload sessions, the cached file catalog and single-file actions.
/// Each backend plugs in through the capability traits.
pub struct DriveSession {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn StorageService>,
    metadata: Option<Arc<dyn MetadataRepository>>,
    signed_url_ttl: Duration,
    queue: Mutex<PendingQueue>,
    catalog: Mutex<FileCatalog>,
    orphans: Mutex<Vec<String>>,
    active_upload: Arc<Mutex<Option<CancellationToken>>>,
    status: watch::Sender<UploadStatus>,
}

/// Releases the upload slot if a pass unwinds or is dropped before it
/// finishes, so the queue does not stay frozen.
struct ActiveUploadGuard<'a> {
    session: &'a DriveSession,
    armed: bool,
}

impl ActiveUploadGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ActiveUploadGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Upload pass ended abnormally; releasing the queue");

        match self.session.active_upload.try_lock() {
            Ok(mut active) => *active = None,
            Err(_) => {
                let active = Arc::clone(&self.session.active_upload);
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        *active.lock().await = None;
                    });
                }
            }
        }
        self.session.status.send_replace(UploadStatus::idle());
    }
}

impl DriveSession {
    pub fn new(
        auth: Arc<dyn AuthService>,
        storage: Arc<dyn StorageService>,
        metadata: Option<Arc<dyn MetadataRepository>>,
        signed_url_ttl: Duration,
    ) -> Self {
        let (status, _) = watch::channel(UploadStatus::idle());

        Self {
            auth,
            storage,
            metadata,
            signed_url_ttl,
            queue: Mutex::new(PendingQueue::new()),
            catalog: Mutex::new(FileCatalog::new()),
            orphans: Mutex::new(Vec::new()),
            active_upload: Arc::new(Mutex::new(None)),
            status,
        }
    }

    pub fn provider_name(&self) -> String {
        self.storage.provider().to_string()
    }

    pub fn has_metadata_store(&self) -> bool {
        self.metadata.is_some()
    }

    // Authentication

    pub async fn current_user(&self) -> Option<UserIdentity> {
        self.auth.current_user().await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, ApplicationError> {
        let user = self.auth.sign_in(email, password).await?;
        self.catalog.lock().await.reset();
        info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SignUpOutcome, ApplicationError> {
        if password != confirm_password {
            return Err(ApplicationError::BadRequest(
                "Passwords do not match".to_string(),
            ));
        }

        let outcome = self.auth.sign_up(email, password).await?;
        info!(user_id = %outcome.user.id, signed_in = outcome.signed_in, "User signed up");

        if let Some(metadata) = &self.metadata {
            if let Err(e) = metadata.create_user_profile(&outcome.user).await {
                warn!(user_id = %outcome.user.id, "Failed to create user profile: {}", e);
            }
        }

        if outcome.signed_in {
            self.catalog.lock().await.reset();
        }

        Ok(outcome)
    }

    pub async fn sign_out(&self) -> Result<(), ApplicationError> {
        let active = self.active_upload.lock().await;
        if active.is_some() {
            return Err(ApplicationError::UploadInProgress);
        }

        let result = self.auth.sign_out().await;
        self.queue.lock().await.clear();
        self.catalog.lock().await.reset();
        drop(active);

        info!("User signed out");
        result
    }

    /// Keeps the cached catalog in step with auth state changes for as long as
    /// the session lives.
    pub fn watch_auth_changes(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.auth.subscribe();
        let session = Arc::downgrade(self);

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let user = changes.borrow_and_update().clone();
                let Some(session) = session.upgrade() else {
                    break;
                };

                match user {
                    Some(user) => info!(user_id = %user.id, "Auth state changed: signed in"),
                    None => info!("Auth state changed: signed out"),
                }
                session.catalog.lock().await.invalidate();
            }
        })
    }

    // Pending queue

    pub async fn queued_files(&self) -> Vec<QueuedFile> {
        self.queue.lock().await.entries().to_vec()
    }

    pub async fn add_files(&self, files: Vec<QueuedFile>) -> Result<Vec<FileIdentity>, ApplicationError> {
        let active = self.active_upload.lock().await;
        if active.is_some() {
            return Err(ApplicationError::UploadInProgress);
        }

        let added = self.queue.lock().await.add_files(files);
        for identity in &added {
            info!(name = %identity.name, size = identity.size, "File queued");
        }
        Ok(added)
    }

    pub async fn remove_file(&self, name: &str) -> Result<bool, ApplicationError> {
        let active = self.active_upload.lock().await;
        if active.is_some() {
            return Err(ApplicationError::UploadInProgress);
        }

        let removed = self.queue.lock().await.remove_file(name).is_some();
        Ok(removed)
    }

    // Upload sessions

    pub fn upload_status(&self) -> UploadStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_upload_status(&self) -> watch::Receiver<UploadStatus> {
        self.status.subscribe()
    }

    /// Starts an upload pass in the background and returns right away. Poll
    /// [`DriveSession::upload_status`] for progress and the final summary.
    pub async fn start_upload(self: &Arc<Self>) -> Result<UploadStatus, ApplicationError> {
        let (session_id, owner, files, cancel) = self.begin_upload().await?;
        let status = self.upload_status();

        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.drive_upload(session_id, owner, files, cancel).await;
        });

        Ok(status)
    }

    /// Runs an upload pass to completion.
    pub async fn upload_pending(&self) -> Result<UploadSummary, ApplicationError> {
        let (session_id, owner, files, cancel) = self.begin_upload().await?;
        Ok(self.drive_upload(session_id, owner, files, cancel).await)
    }

    /// Signals the running pass to stop. Returns false when nothing runs.
    pub async fn cancel_upload(&self) -> bool {
        match self.active_upload.lock().await.as_ref() {
            Some(cancel) => {
                info!("Upload cancellation requested");
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    async fn begin_upload(
        &self,
    ) -> Result<(Uuid, UserIdentity, Vec<QueuedFile>, CancellationToken), ApplicationError> {
        let owner = self
            .auth
            .current_user()
            .await
            .ok_or_else(|| ApplicationError::Unauthorized(LOGIN_TO_UPLOAD.to_string()))?;

        let mut active = self.active_upload.lock().await;
        if active.is_some() {
            return Err(ApplicationError::UploadInProgress);
        }

        let files = {
            let queue = self.queue.lock().await;
            if queue.is_empty() {
                return Err(ApplicationError::EmptyQueue);
            }
            queue.entries().to_vec()
        };

        let session_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        *active = Some(cancel.clone());

        let mut tracker = ProgressTracker::new(
            session_id,
            files.iter().map(|f| (f.name.clone(), f.size())),
        );
        self.status.send_replace(UploadStatus {
            state: UploadState::Running,
            progress: Some(tracker.snapshot()),
            summary: None,
        });

        Ok((session_id, owner, files, cancel))
    }

    async fn drive_upload(
        &self,
        session_id: Uuid,
        owner: UserIdentity,
        files: Vec<QueuedFile>,
        cancel: CancellationToken,
    ) -> UploadSummary {
        let guard = ActiveUploadGuard {
            session: self,
            armed: true,
        };

        let driver = UploadDriver::new(Arc::clone(&self.storage), self.metadata.clone());
        let summary = driver
            .run(session_id, &owner, &files, &cancel, |progress| {
                self.status
                    .send_modify(move |status| status.progress = Some(progress));
            })
            .await;

        let mut active = self.active_upload.lock().await;
        self.queue.lock().await.clear();
        self.catalog.lock().await.invalidate();
        self.status.send_modify(|status| {
            status.state = UploadState::Finished;
            status.summary = Some(summary.clone());
        });
        *active = None;
        guard.disarm();

        summary
    }

    // Catalog

    pub async fn list_files(&self, query: &FileQuery) -> Result<FileListing, ApplicationError> {
        let owner = self.require_user(LOGIN_TO_VIEW).await?;
        let mut catalog = self.catalog.lock().await;
        self.ensure_catalog(&owner, &mut catalog).await?;

        let files: Vec<CatalogEntry> = catalog.query(query).into_iter().cloned().collect();
        let message = if catalog.is_empty() {
            Some(NO_FILES_MESSAGE.to_string())
        } else if files.is_empty() {
            Some(NO_MATCHES_MESSAGE.to_string())
        } else {
            None
        };

        Ok(FileListing { files, message })
    }

    /// Drops the cached catalog and fetches it again. Returns the record count.
    pub async fn refresh_files(&self) -> Result<usize, ApplicationError> {
        let owner = self.require_user(LOGIN_TO_VIEW).await?;
        let mut catalog = self.catalog.lock().await;
        catalog.invalidate();
        self.ensure_catalog(&owner, &mut catalog).await?;
        Ok(catalog.entries().len())
    }

    pub async fn orphaned_paths(&self) -> Vec<String> {
        self.orphans.lock().await.clone()
    }

    async fn ensure_catalog(
        &self,
        owner: &UserIdentity,
        catalog: &mut FileCatalog,
    ) -> Result<(), ApplicationError> {
        if !catalog.needs_refresh(&owner.id) {
            return Ok(());
        }

        self.reconcile_orphans().await;

        let records = match &self.metadata {
            Some(metadata) => metadata.list_file_records(&owner.id).await?,
            None => {
                let prefix = self.storage.owner_prefix(&owner.id);
                self.storage
                    .list_objects(&prefix)
                    .await?
                    .into_iter()
                    .map(|object| FileRecord::from_stored_object(&owner.id, object))
                    .collect()
            }
        };

        info!(user_id = %owner.id, files = records.len(), "Loaded file catalog");
        catalog.load(&owner.id, records);
        Ok(())
    }

    /// Retries deleting blobs whose metadata record is already gone.
    async fn reconcile_orphans(&self) {
        let mut orphans = self.orphans.lock().await;
        if orphans.is_empty() {
            return;
        }

        match self.storage.delete_objects(&orphans).await {
            Ok(()) => {
                info!(count = orphans.len(), "Removed orphaned objects");
                orphans.clear();
            }
            Err(e) => warn!(count = orphans.len(), "Orphaned objects still present: {}", e),
        }
    }

    // Single-file actions

    pub async fn preview_file(&self, id: &str) -> Result<FilePreview, ApplicationError> {
        let entry = self.find_entry(id).await?;
        let url = self.reference_for(&entry.record).await?;

        Ok(FilePreview {
            kind: PreviewKind::for_content_type(&entry.record.content_type),
            record: entry.record,
            url,
        })
    }

    /// Short-lived signed reference for downloading the file.
    pub async fn download_link(&self, id: &str) -> Result<FileLink, ApplicationError> {
        let entry = self.find_entry(id).await?;
        let url = self
            .storage
            .signed_reference(&entry.record.path, self.signed_url_ttl)
            .await?;

        Ok(FileLink {
            url,
            expires_in: Some(self.signed_url_ttl),
        })
    }

    pub async fn share_link(&self, id: &str) -> Result<FileLink, ApplicationError> {
        let entry = self.find_entry(id).await?;
        let url = self.reference_for(&entry.record).await?;
        Ok(FileLink {
            url,
            expires_in: None,
        })
    }

    /// Deletes metadata first, then bytes. A failed bytes delete after the
    /// record is gone leaves an orphan that the next refresh cleans up.
    pub async fn delete_file(&self, id: &str, confirmed: bool) -> Result<DeleteOutcome, ApplicationError> {
        if !confirmed {
            return Err(ApplicationError::ConfirmationRequired);
        }

        let entry = self.find_entry(id).await?;
        let path = entry.record.path.clone();

        let orphaned = match &self.metadata {
            Some(metadata) => {
                metadata.delete_file_record(&entry.record.id).await?;
                match self.storage.delete_objects(&[path.clone()]).await {
                    Ok(()) => false,
                    Err(e) => {
                        warn!(path = %path, "Metadata deleted but object removal failed: {}", e);
                        self.orphans.lock().await.push(path);
                        true
                    }
                }
            }
            None => {
                self.storage.delete_objects(&[path]).await?;
                false
            }
        };

        self.catalog.lock().await.remove(id);
        info!(file_id = %id, orphaned, "File deleted");

        Ok(DeleteOutcome {
            id: id.to_string(),
            orphaned,
        })
    }

    async fn require_user(&self, message: &str) -> Result<UserIdentity, ApplicationError> {
        self.auth
            .current_user()
            .await
            .ok_or_else(|| ApplicationError::Unauthorized(message.to_string()))
    }

    async fn find_entry(&self, id: &str) -> Result<CatalogEntry, ApplicationError> {
        let owner = self.require_user(LOGIN_TO_VIEW).await?;
        let mut catalog = self.catalog.lock().await;
        self.ensure_catalog(&owner, &mut catalog).await?;
        catalog.get(id).cloned().ok_or(ApplicationError::NotFound)
    }

    async fn reference_for(&self, record: &FileRecord) -> Result<String, ApplicationError> {
        match &record.download_url {
            Some(url) => Ok(url.clone()),
            None => self.storage.public_reference(&record.path).await,
        }
    }
}

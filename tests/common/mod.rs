#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use futures::{stream, StreamExt};
use tokio::sync::watch;

use drive_service::{
    application::{
        drive_session::DriveSession,
        dto::metadata_dto::FileRecordDTO,
        error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
        services::{
            auth_service::AuthService,
            storage_service::{StorageService, TransferEvent, TransferStream, UploadOptions},
        },
    },
    domain::{
        config::local::Provider,
        models::{
            file::{QueuedFile, StoredObject},
            file_record::FileRecord,
            user::{SignUpOutcome, UserIdentity},
        },
    },
};

pub const PASSWORD: &str = "correct horse";

pub fn user(id: &str) -> UserIdentity {
    UserIdentity {
        id: id.to_string(),
        email: format!("{}@drive.test", id),
    }
}

pub fn file(name: &str, size: usize) -> QueuedFile {
    QueuedFile::new(name, Bytes::from(vec![b'x'; size]), None)
}

/// Shared, ordered record of collaborator calls.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub struct FakeAuth {
    user: watch::Sender<Option<UserIdentity>>,
    confirm_by_email: AtomicBool,
}

impl FakeAuth {
    pub fn signed_in(user: UserIdentity) -> Arc<Self> {
        Arc::new(Self {
            user: watch::channel(Some(user)).0,
            confirm_by_email: AtomicBool::new(false),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            user: watch::channel(None).0,
            confirm_by_email: AtomicBool::new(false),
        })
    }

    pub fn require_email_confirmation(&self) {
        self.confirm_by_email.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.user.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.user.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, ApplicationError> {
        if password != PASSWORD {
            return Err(ApplicationError::AuthFailed(
                "Invalid login credentials".to_string(),
            ));
        }
        let id = email.split('@').next().unwrap_or(email);
        let signed_in = user(id);
        self.user.send_replace(Some(signed_in.clone()));
        Ok(signed_in)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, ApplicationError> {
        let id = email.split('@').next().unwrap_or(email);
        let new_user = user(id);
        let signed_in = !self.confirm_by_email.load(Ordering::SeqCst);
        if signed_in {
            self.user.send_replace(Some(new_user.clone()));
        }
        Ok(SignUpOutcome {
            user: new_user,
            signed_in,
        })
    }

    async fn sign_out(&self) -> Result<(), ApplicationError> {
        self.user.send_replace(None);
        Ok(())
    }
}

/// In-memory object store. Uploads report progress in two halves.
pub struct FakeStorage {
    pub log: CallLog,
    objects: Mutex<Vec<StoredObject>>,
    failing_uploads: Mutex<HashSet<String>>,
    stalled_upload: Mutex<Option<String>>,
    panicking_upload: Mutex<Option<String>>,
    fail_deletes: AtomicBool,
}

impl FakeStorage {
    pub fn new(log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            log,
            objects: Mutex::new(Vec::new()),
            failing_uploads: Mutex::new(HashSet::new()),
            stalled_upload: Mutex::new(None),
            panicking_upload: Mutex::new(None),
            fail_deletes: AtomicBool::new(false),
        })
    }

    pub fn fail_upload_of(&self, name: &str) {
        self.failing_uploads.lock().unwrap().insert(name.to_string());
    }

    /// The upload of `name` reports one tick and then never finishes.
    pub fn stall_upload_of(&self, name: &str) {
        *self.stalled_upload.lock().unwrap() = Some(name.to_string());
    }

    /// Starting the upload of `name` panics.
    pub fn panic_on_upload_of(&self, name: &str) {
        *self.panicking_upload.lock().unwrap() = Some(name.to_string());
    }

    pub fn object_size(&self, path: &str) -> Option<u64> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.path == path)
            .map(|o| o.size)
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, path: &str, size: u64, day: u32) {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        self.objects.lock().unwrap().push(StoredObject {
            path: path.to_string(),
            name,
            size,
            content_type: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap()),
            download_url: None,
        });
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.path.clone())
            .collect()
    }
}

#[async_trait]
impl StorageService for FakeStorage {
    fn provider(&self) -> Provider {
        Provider::Supabase
    }

    fn object_path(&self, owner_id: &str, file_name: &str) -> String {
        format!("{}/{}", owner_id, file_name)
    }

    fn owner_prefix(&self, owner_id: &str) -> String {
        format!("{}/", owner_id)
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, ApplicationError> {
        self.log.push(format!("list:{}", prefix));
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.path.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn upload_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        _options: UploadOptions,
    ) -> TransferStream {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let size = data.len() as u64;
        self.log.push(format!("upload-start:{}", name));
        if self.panicking_upload.lock().unwrap().as_deref() == Some(name.as_str()) {
            panic!("storage client crashed on {}", name);
        }

        let half = stream::iter(vec![Ok(TransferEvent::Progress {
            bytes_transferred: size / 2,
        })]);

        if self.stalled_upload.lock().unwrap().as_deref() == Some(name.as_str()) {
            return half.chain(stream::pending()).boxed();
        }

        if self.failing_uploads.lock().unwrap().contains(&name) {
            let log = self.log.clone();
            return half
                .chain(stream::once(async move {
                    log.push(format!("upload-failed:{}", name));
                    Err(ApplicationError::ProviderError("Payload too large".to_string()))
                }))
                .boxed();
        }

        let object = StoredObject {
            path: path.to_string(),
            name: name.clone(),
            size,
            content_type: Some(content_type.to_string()),
            created_at: Some(Utc::now()),
            download_url: None,
        };
        // Same path overwrites.
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|o| o.path != object.path);
        objects.push(object.clone());
        drop(objects);

        let log = self.log.clone();
        half.chain(stream::iter(vec![Ok(TransferEvent::Progress {
            bytes_transferred: size,
        })]))
        .chain(stream::once(async move {
            log.push(format!("upload-done:{}", name));
            Ok(TransferEvent::Completed(object))
        }))
        .boxed()
    }

    async fn public_reference(&self, path: &str) -> Result<String, ApplicationError> {
        Ok(format!("https://cdn.drive.test/public/{}", path))
    }

    async fn signed_reference(&self, path: &str, ttl: Duration) -> Result<String, ApplicationError> {
        Ok(format!(
            "https://cdn.drive.test/sign/{}?expires={}",
            path,
            ttl.as_secs()
        ))
    }

    async fn delete_objects(&self, paths: &[String]) -> Result<(), ApplicationError> {
        self.log.push(format!("storage.delete:{}", paths.join(",")));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ApplicationError::ProviderError("Storage unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .retain(|o| !paths.contains(&o.path));
        Ok(())
    }
}

pub struct FakeMetadata {
    pub log: CallLog,
    records: Mutex<Vec<FileRecord>>,
    next_id: AtomicUsize,
    fail_creates: AtomicBool,
    pub profiles: Mutex<Vec<UserIdentity>>,
}

impl FakeMetadata {
    pub fn new(log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            log,
            records: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            fail_creates: AtomicBool::new(false),
            profiles: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataRepository for FakeMetadata {
    async fn save_file_record(&self, record: FileRecordDTO) -> Result<FileRecord, ApplicationError> {
        self.log.push(format!("metadata.save:{}", record.name));
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(ApplicationError::DatabaseError("write rejected".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.owner_id == record.owner_id && r.path == record.path)
        {
            *existing = record.into_record(existing.id.clone());
            return Ok(existing.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let created = record.into_record(id);
        records.push(created.clone());
        Ok(created)
    }

    async fn list_file_records(&self, owner_id: &str) -> Result<Vec<FileRecord>, ApplicationError> {
        self.log.push(format!("metadata.list:{}", owner_id));
        let mut records: Vec<FileRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(records)
    }

    async fn delete_file_record(&self, id: &str) -> Result<(), ApplicationError> {
        self.log.push(format!("metadata.delete:{}", id));
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(ApplicationError::NotFound);
        }
        Ok(())
    }

    async fn create_user_profile(&self, user: &UserIdentity) -> Result<(), ApplicationError> {
        self.profiles.lock().unwrap().push(user.clone());
        Ok(())
    }
}

pub struct Harness {
    pub log: CallLog,
    pub auth: Arc<FakeAuth>,
    pub storage: Arc<FakeStorage>,
    pub metadata: Option<Arc<FakeMetadata>>,
    pub drive: Arc<DriveSession>,
}

impl Harness {
    pub fn new(auth: Arc<FakeAuth>, with_metadata: bool) -> Self {
        let log = CallLog::default();
        let storage = FakeStorage::new(log.clone());
        let metadata = with_metadata.then(|| FakeMetadata::new(log.clone()));

        let drive = Arc::new(DriveSession::new(
            auth.clone(),
            storage.clone(),
            metadata
                .clone()
                .map(|m| m as Arc<dyn MetadataRepository>),
            Duration::from_secs(60),
        ));

        Self {
            log,
            auth,
            storage,
            metadata,
            drive,
        }
    }

    pub fn signed_in(with_metadata: bool) -> Self {
        Self::new(FakeAuth::signed_in(user("u1")), with_metadata)
    }
}

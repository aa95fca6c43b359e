mod error;
mod firebase_auth;
mod firebase_storage;
mod firestore_metadata_repository;
mod session_store;
mod supabase_auth;
mod supabase_storage;
mod token_claims;
mod transfer;

pub use error::{vendor_message, StorageError};
pub use firebase_auth::FirebaseAuthService;
pub use firebase_storage::FirebaseStorageService;
pub use firestore_metadata_repository::FirestoreMetadataRepository;
pub use session_store::SessionStore;
pub use supabase_auth::SupabaseAuthService;
pub use supabase_storage::SupabaseStorageService;

use std::sync::Arc;

use crate::{
    application::{
        repositories::metadata_repository::MetadataRepository,
        services::{auth_service::AuthService, storage_service::StorageService},
    },
    domain::config::{local::Provider, secrets::Secrets},
};

/// The collaborators of one vendor, sharing a single signed-in session.
pub struct Backend {
    pub auth: Arc<dyn AuthService>,
    pub storage: Arc<dyn StorageService>,
    pub metadata: Option<Arc<dyn MetadataRepository>>,
}

impl Backend {
    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataRepository>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

pub fn create_backend(provider: &Provider, secrets: &Secrets) -> Result<Backend, StorageError> {
    let sessions = Arc::new(SessionStore::new());

    match provider {
        Provider::Supabase => {
            let supabase_secrets = secrets.supabase_secrets.as_ref().ok_or_else(|| {
                StorageError::InvalidCredentials("Supabase secrets not found".to_string())
            })?;

            Ok(Backend {
                auth: Arc::new(SupabaseAuthService::new(supabase_secrets, sessions.clone())),
                storage: Arc::new(SupabaseStorageService::new(supabase_secrets, sessions)),
                metadata: None,
            })
        }
        Provider::Firebase => {
            let firebase_secrets = secrets.firebase_secrets.as_ref().ok_or_else(|| {
                StorageError::InvalidCredentials("Firebase secrets not found".to_string())
            })?;

            Ok(Backend {
                auth: Arc::new(FirebaseAuthService::new(firebase_secrets, sessions.clone())),
                storage: Arc::new(FirebaseStorageService::new(firebase_secrets, sessions.clone())),
                metadata: Some(Arc::new(FirestoreMetadataRepository::new(
                    firebase_secrets,
                    sessions,
                ))),
            })
        }
    }
}

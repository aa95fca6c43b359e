use serde::{Deserialize, Serialize};

pub const DEFAULT_SUPABASE_BUCKET: &str = "useruploads";
pub const FIREBASE_IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com";
pub const FIREBASE_TOKEN_BASE: &str = "https://securetoken.googleapis.com";
pub const FIREBASE_STORAGE_BASE: &str = "https://firebasestorage.googleapis.com";
pub const FIREBASE_FIRESTORE_BASE: &str = "https://firestore.googleapis.com";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SupabaseSecrets {
    #[serde(rename = "url")]
    pub url: String,
    #[serde(rename = "anonKey")]
    pub anon_key: String,
    #[serde(rename = "bucketName")]
    pub bucket_name: String,
    #[serde(rename = "databaseUrl")]
    pub database_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FirebaseSecrets {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(rename = "storageBucket")]
    pub storage_bucket: String,
    #[serde(rename = "identityBaseUrl")]
    pub identity_base_url: String,
    #[serde(rename = "tokenBaseUrl")]
    pub token_base_url: String,
    #[serde(rename = "storageBaseUrl")]
    pub storage_base_url: String,
    #[serde(rename = "firestoreBaseUrl")]
    pub firestore_base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Secrets {
    #[serde(rename = "supabaseSecrets")]
    pub supabase_secrets: Option<SupabaseSecrets>,
    #[serde(rename = "firebaseSecrets")]
    pub firebase_secrets: Option<FirebaseSecrets>,
}

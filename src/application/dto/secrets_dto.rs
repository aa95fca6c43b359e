use serde::{Deserialize, Serialize};

use crate::{
    application::dto::local_config_dto::env_var,
    domain::config::secrets::{
        FirebaseSecrets, Secrets, SupabaseSecrets, DEFAULT_SUPABASE_BUCKET,
        FIREBASE_FIRESTORE_BASE, FIREBASE_IDENTITY_BASE, FIREBASE_STORAGE_BASE,
        FIREBASE_TOKEN_BASE,
    },
};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SecretsDTO {
    #[serde(rename = "supabaseUrl")]
    pub supabase_url: Option<String>,
    #[serde(rename = "supabaseAnonKey")]
    pub supabase_anon_key: Option<String>,
    #[serde(rename = "supabaseBucket")]
    pub supabase_bucket: Option<String>,
    #[serde(rename = "databaseUrl")]
    pub database_url: Option<String>,
    #[serde(rename = "firebaseApiKey")]
    pub firebase_api_key: Option<String>,
    #[serde(rename = "firebaseProjectId")]
    pub firebase_project_id: Option<String>,
    #[serde(rename = "firebaseStorageBucket")]
    pub firebase_storage_bucket: Option<String>,
}

impl SecretsDTO {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut dto = SecretsDTO {
            supabase_url: lookup("SUPABASE_URL"),
            supabase_anon_key: lookup("SUPABASE_ANON_KEY"),
            supabase_bucket: lookup("SUPABASE_BUCKET"),
            database_url: lookup("DATABASE_URL"),
            firebase_api_key: lookup("FIREBASE_API_KEY"),
            firebase_project_id: lookup("FIREBASE_PROJECT_ID"),
            firebase_storage_bucket: lookup("FIREBASE_STORAGE_BUCKET"),
        };
        dto.sanitize();
        dto
    }

    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    pub fn sanitize(&mut self) {
        if let Some(ref mut url) = self.supabase_url {
            *url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ref mut key) = self.supabase_anon_key {
            *key = key.trim().to_string();
        }
        if let Some(ref mut key) = self.firebase_api_key {
            *key = key.trim().to_string();
        }
    }
}

impl From<SecretsDTO> for Secrets {
    fn from(value: SecretsDTO) -> Self {
        let supabase_secrets = match (value.supabase_url, value.supabase_anon_key) {
            (Some(url), Some(anon_key)) => Some(SupabaseSecrets {
                url,
                anon_key,
                bucket_name: value
                    .supabase_bucket
                    .unwrap_or_else(|| DEFAULT_SUPABASE_BUCKET.to_string()),
                database_url: value.database_url,
            }),
            _ => None,
        };

        let firebase_secrets = match (
            value.firebase_api_key,
            value.firebase_project_id,
            value.firebase_storage_bucket,
        ) {
            (Some(api_key), Some(project_id), storage_bucket) => Some(FirebaseSecrets {
                storage_bucket: storage_bucket
                    .unwrap_or_else(|| format!("{}.appspot.com", project_id)),
                api_key,
                project_id,
                identity_base_url: FIREBASE_IDENTITY_BASE.to_string(),
                token_base_url: FIREBASE_TOKEN_BASE.to_string(),
                storage_base_url: FIREBASE_STORAGE_BASE.to_string(),
                firestore_base_url: FIREBASE_FIRESTORE_BASE.to_string(),
            }),
            _ => None,
        };

        Secrets {
            supabase_secrets,
            firebase_secrets,
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    application::{
        error::ApplicationError,
        services::storage_service::{StorageService, TransferStream, UploadOptions},
    },
    domain::{config::local::Provider, config::secrets::SupabaseSecrets, models::file::StoredObject},
    services::{
        error::{response_error, StorageError},
        session_store::SessionStore,
        transfer::{encode_path, progress_body, track_transfer},
    },
};

const LIST_LIMIT: u32 = 100;
const PLACEHOLDER_NAME: &str = ".emptyFolderPlaceholder";

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    size: Option<u64>,
    mimetype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
    // Folders come back without an id.
    id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    metadata: Option<ObjectMetadata>,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

pub struct SupabaseStorageService {
    client: Client,
    storage_url: String,
    anon_key: String,
    bucket_name: String,
    sessions: Arc<SessionStore>,
}

impl SupabaseStorageService {
    pub fn new(secrets: &SupabaseSecrets, sessions: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            storage_url: format!("{}/storage/v1", secrets.url.trim_end_matches('/')),
            anon_key: secrets.anon_key.clone(),
            bucket_name: secrets.bucket_name.clone(),
            sessions,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .sessions
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());

        request.header("apikey", &self.anon_key).bearer_auth(token)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.storage_url,
            self.bucket_name,
            encode_path(path)
        )
    }
}

#[async_trait]
impl StorageService for SupabaseStorageService {
    fn provider(&self) -> Provider {
        Provider::Supabase
    }

    fn object_path(&self, owner_id: &str, file_name: &str) -> String {
        format!("{}/{}", owner_id, file_name)
    }

    fn owner_prefix(&self, owner_id: &str) -> String {
        owner_id.to_string()
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, ApplicationError> {
        let url = format!("{}/object/list/{}", self.storage_url, self.bucket_name);
        let prefix = prefix.trim_end_matches('/');

        let mut listed: Vec<ListedObject> = Vec::new();
        let mut offset = 0;
        loop {
            let response = self
                .authorized(self.client.post(&url))
                .json(&json!({
                    "prefix": prefix,
                    "limit": LIST_LIMIT,
                    "offset": offset,
                    "sortBy": { "column": "created_at", "order": "desc" },
                }))
                .send()
                .await
                .map_err(StorageError::from)?;

            if !response.status().is_success() {
                return Err(response_error(response).await.into());
            }

            let page: Vec<ListedObject> = response
                .json()
                .await
                .map_err(|e| StorageError::ProviderError(e.to_string()))?;

            // A short page is the last one.
            let page_len = page.len() as u32;
            listed.extend(page);
            if page_len < LIST_LIMIT {
                break;
            }
            offset += LIST_LIMIT;
        }

        let objects = listed
            .into_iter()
            .filter(|o| o.id.is_some() && o.name != PLACEHOLDER_NAME)
            .map(|o| {
                let (size, content_type) = match o.metadata {
                    Some(m) => (m.size.unwrap_or(0), m.mimetype),
                    None => (0, None),
                };

                StoredObject {
                    path: if prefix.is_empty() {
                        o.name.clone()
                    } else {
                        format!("{}/{}", prefix, o.name)
                    },
                    name: o.name,
                    size,
                    content_type,
                    created_at: o.created_at,
                    download_url: None,
                }
            })
            .collect();

        Ok(objects)
    }

    fn upload_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        options: UploadOptions,
    ) -> TransferStream {
        let size = data.len() as u64;
        let (body, progress) = progress_body(data);

        let request = self
            .authorized(self.client.post(self.object_url(path)))
            .header("content-type", content_type)
            .header("x-upsert", options.overwrite.to_string())
            .body(body);

        let path = path.to_string();
        let content_type = content_type.to_string();

        track_transfer(progress, async move {
            let response = request.send().await.map_err(StorageError::from)?;
            if !response.status().is_success() {
                return Err(response_error(response).await.into());
            }

            let name = path.rsplit('/').next().unwrap_or(&path).to_string();
            Ok::<_, ApplicationError>(StoredObject {
                path,
                name,
                size,
                content_type: Some(content_type),
                created_at: Some(Utc::now()),
                download_url: None,
            })
        })
    }

    async fn public_reference(&self, path: &str) -> Result<String, ApplicationError> {
        Ok(format!(
            "{}/object/public/{}/{}",
            self.storage_url,
            self.bucket_name,
            encode_path(path)
        ))
    }

    async fn signed_reference(&self, path: &str, ttl: Duration) -> Result<String, ApplicationError> {
        let url = format!(
            "{}/object/sign/{}/{}",
            self.storage_url,
            self.bucket_name,
            encode_path(path)
        );

        let response = self
            .authorized(self.client.post(&url))
            .json(&json!({ "expiresIn": ttl.as_secs() }))
            .send()
            .await
            .map_err(StorageError::from)?;

        if !response.status().is_success() {
            return Err(response_error(response).await.into());
        }

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        Ok(format!("{}{}", self.storage_url, signed.signed_url))
    }

    async fn delete_objects(&self, paths: &[String]) -> Result<(), ApplicationError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = format!("{}/object/{}", self.storage_url, self.bucket_name);
        let response = self
            .authorized(self.client.delete(&url))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await
            .map_err(StorageError::from)?;

        if !response.status().is_success() {
            return Err(response_error(response).await.into());
        }

        Ok(())
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::{
        error::ApplicationError,
        services::storage_service::{StorageService, TransferStream, UploadOptions},
    },
    domain::{config::local::Provider, config::secrets::FirebaseSecrets, models::file::StoredObject},
    services::{
        error::{response_error, StorageError},
        session_store::SessionStore,
        transfer::{progress_body, track_transfer},
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    name: String,
    // The JSON API sends sizes as decimal strings.
    size: Option<String>,
    content_type: Option<String>,
    time_created: Option<DateTime<Utc>>,
    download_tokens: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectResource>,
    next_page_token: Option<String>,
}

#[derive(Clone)]
pub struct FirebaseStorageService {
    client: Client,
    bucket_url: String,
    sessions: Arc<SessionStore>,
}

impl FirebaseStorageService {
    pub fn new(secrets: &FirebaseSecrets, sessions: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            bucket_url: format!(
                "{}/v0/b/{}/o",
                secrets.storage_base_url.trim_end_matches('/'),
                secrets.storage_bucket
            ),
            sessions,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.sessions.access_token() {
            Some(token) => request.header("Authorization", format!("Firebase {}", token)),
            None => request,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.bucket_url, urlencoding::encode(path))
    }

    fn download_url(&self, path: &str, token: Option<&str>) -> String {
        // An object may carry several comma-separated tokens; any of them works.
        match token.and_then(|t| t.split(',').next()) {
            Some(token) => format!("{}?alt=media&token={}", self.object_url(path), token),
            None => format!("{}?alt=media", self.object_url(path)),
        }
    }

    fn to_stored_object(&self, resource: ObjectResource) -> StoredObject {
        let name = resource
            .name
            .rsplit('/')
            .next()
            .unwrap_or(&resource.name)
            .to_string();

        StoredObject {
            download_url: resource
                .download_tokens
                .as_deref()
                .map(|t| self.download_url(&resource.name, Some(t))),
            size: resource
                .size
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            content_type: resource.content_type,
            created_at: resource.time_created,
            path: resource.name,
            name,
        }
    }

    async fn fetch_resource(&self, path: &str) -> Result<ObjectResource, StorageError> {
        let response = self
            .authorized(self.client.get(self.object_url(path)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))
    }
}

#[async_trait]
impl StorageService for FirebaseStorageService {
    fn provider(&self) -> Provider {
        Provider::Firebase
    }

    fn object_path(&self, owner_id: &str, file_name: &str) -> String {
        format!("users/{}/{}", owner_id, file_name)
    }

    fn owner_prefix(&self, owner_id: &str) -> String {
        format!("users/{}/", owner_id)
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, ApplicationError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .authorized(self.client.get(&self.bucket_url))
                .query(&[("prefix", prefix), ("delimiter", "/")]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(StorageError::from)?;
            if !response.status().is_success() {
                return Err(response_error(response).await.into());
            }

            let listed: ListResponse = response
                .json()
                .await
                .map_err(|e| StorageError::ProviderError(e.to_string()))?;

            items.extend(listed.items);
            match listed.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        let mut objects: Vec<StoredObject> = items
            .into_iter()
            .filter(|item| !item.name.ends_with('/'))
            .map(|item| self.to_stored_object(item))
            .collect();
        objects.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(objects)
    }

    // Media uploads always replace an existing object of the same name.
    fn upload_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        _options: UploadOptions,
    ) -> TransferStream {
        let (body, progress) = progress_body(data);

        let request = self
            .authorized(self.client.post(&self.bucket_url))
            .query(&[("uploadType", "media"), ("name", path)])
            .header("content-type", content_type)
            .body(body);

        let service = self.clone();

        track_transfer(progress, async move {
            let response = request.send().await.map_err(StorageError::from)?;
            if !response.status().is_success() {
                return Err(response_error(response).await.into());
            }

            let resource: ObjectResource = response
                .json()
                .await
                .map_err(|e| StorageError::ProviderError(e.to_string()))?;

            Ok::<_, ApplicationError>(service.to_stored_object(resource))
        })
    }

    async fn public_reference(&self, path: &str) -> Result<String, ApplicationError> {
        let resource = self.fetch_resource(path).await?;
        Ok(self.download_url(path, resource.download_tokens.as_deref()))
    }

    // Token URLs do not expire; the requested lifetime is not applicable.
    async fn signed_reference(&self, path: &str, _ttl: Duration) -> Result<String, ApplicationError> {
        self.public_reference(path).await
    }

    async fn delete_objects(&self, paths: &[String]) -> Result<(), ApplicationError> {
        for path in paths {
            let response = self
                .authorized(self.client.delete(self.object_url(path)))
                .send()
                .await
                .map_err(StorageError::from)?;

            if response.status().as_u16() == 404 {
                debug!(path = %path, "Object already gone");
                continue;
            }

            if !response.status().is_success() {
                return Err(response_error(response).await.into());
            }
        }

        Ok(())
    }
}

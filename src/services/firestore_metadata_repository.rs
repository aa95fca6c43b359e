use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    application::{
        dto::metadata_dto::FileRecordDTO, error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
    },
    domain::{
        config::secrets::FirebaseSecrets,
        models::{file_record::FileRecord, user::UserIdentity},
    },
    services::{
        error::{response_error, StorageError},
        session_store::SessionStore,
    },
};

const FILES_COLLECTION: &str = "files";
const USERS_COLLECTION: &str = "users";

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    document: Option<Document>,
}

/// File records and user profiles kept in Cloud Firestore, through its REST
/// API and the signed-in user's ID token.
pub struct FirestoreMetadataRepository {
    client: Client,
    documents_url: String,
    sessions: Arc<SessionStore>,
}

impl FirestoreMetadataRepository {
    pub fn new(secrets: &FirebaseSecrets, sessions: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            documents_url: format!(
                "{}/v1/projects/{}/databases/(default)/documents",
                secrets.firestore_base_url.trim_end_matches('/'),
                secrets.project_id
            ),
            sessions,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.sessions.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApplicationError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(StorageError::from)?;

        if !response.status().is_success() {
            return Err(database_error(response_error(response).await));
        }

        Ok(response)
    }
}

#[async_trait]
impl MetadataRepository for FirestoreMetadataRepository {
    // PATCH without an update mask writes the whole document, creating it
    // if needed.
    async fn save_file_record(&self, record: FileRecordDTO) -> Result<FileRecord, ApplicationError> {
        let url = format!(
            "{}/{}/{}",
            self.documents_url,
            FILES_COLLECTION,
            urlencoding::encode(&file_document_id(&record.path))
        );
        let body = json!({ "fields": file_fields(&record) });

        let response = self.send(self.client.patch(&url).json(&body)).await?;
        let document: Document = response
            .json()
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(record.into_record(document_id(&document.name)))
    }

    async fn list_file_records(&self, owner_id: &str) -> Result<Vec<FileRecord>, ApplicationError> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": FILES_COLLECTION }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "userId" },
                        "op": "EQUAL",
                        "value": { "stringValue": owner_id },
                    }
                },
                "orderBy": [{
                    "field": { "fieldPath": "uploadedAt" },
                    "direction": "DESCENDING",
                }],
            }
        });

        let response = self.send(self.client.post(&url).json(&body)).await?;
        let results: Vec<QueryResult> = response
            .json()
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        results
            .into_iter()
            .filter_map(|result| result.document)
            .map(record_from_document)
            .collect()
    }

    async fn delete_file_record(&self, id: &str) -> Result<(), ApplicationError> {
        let url = format!(
            "{}/{}/{}",
            self.documents_url,
            FILES_COLLECTION,
            urlencoding::encode(id)
        );
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn create_user_profile(&self, user: &UserIdentity) -> Result<(), ApplicationError> {
        let url = format!(
            "{}/{}/{}",
            self.documents_url,
            USERS_COLLECTION,
            urlencoding::encode(&user.id)
        );
        let body = json!({
            "fields": {
                "email": { "stringValue": user.email },
                "createdAt": { "timestampValue": Utc::now().to_rfc3339() },
                "storageUsed": { "integerValue": "0" },
            }
        });

        self.send(self.client.patch(&url).json(&body)).await?;
        Ok(())
    }
}

fn database_error(error: StorageError) -> ApplicationError {
    match error {
        StorageError::NotFound(_) => ApplicationError::NotFound,
        other => ApplicationError::DatabaseError(other.to_string()),
    }
}

fn file_fields(record: &FileRecordDTO) -> Value {
    let download_url = match &record.download_url {
        Some(url) => json!({ "stringValue": url }),
        None => json!({ "nullValue": null }),
    };

    json!({
        "userId": { "stringValue": record.owner_id },
        "name": { "stringValue": record.name },
        "type": { "stringValue": record.content_type },
        "size": { "integerValue": record.size.to_string() },
        "path": { "stringValue": record.path },
        "downloadURL": download_url,
        "uploadedAt": { "timestampValue": record.uploaded_at.to_rfc3339() },
    })
}

/// Document ids cannot contain '/', so the object path is percent-encoded.
fn file_document_id(path: &str) -> String {
    urlencoding::encode(path).into_owned()
}

/// Last segment of a document resource name.
fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

fn record_from_document(document: Document) -> Result<FileRecord, ApplicationError> {
    let fields = &document.fields;
    let missing = |field: &str| {
        ApplicationError::DatabaseError(format!(
            "File record {} is missing '{}'",
            document.name, field
        ))
    };

    Ok(FileRecord {
        id: document_id(&document.name),
        owner_id: string_value(fields, "userId").ok_or_else(|| missing("userId"))?,
        name: string_value(fields, "name").ok_or_else(|| missing("name"))?,
        content_type: string_value(fields, "type").unwrap_or_default(),
        size: integer_value(fields, "size").unwrap_or(0),
        path: string_value(fields, "path").ok_or_else(|| missing("path"))?,
        download_url: string_value(fields, "downloadURL"),
        uploaded_at: timestamp_value(fields, "uploadedAt").unwrap_or_else(Utc::now),
    })
}

fn string_value(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn integer_value(fields: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = fields.get(key)?;
    match value.get("integerValue")? {
        Value::String(s) => s.parse().ok(),
        other => other.as_u64(),
    }
}

fn timestamp_value(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

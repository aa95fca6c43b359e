use reqwest::Response;
use serde_json::Value;
use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    ProviderError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ApplicationError::NotFound,
            StorageError::Unauthorized(msg) => ApplicationError::AuthFailed(msg),
            StorageError::ProviderError(msg) | StorageError::NetworkError(msg) => {
                ApplicationError::ProviderError(msg)
            }
            StorageError::InvalidCredentials(msg) | StorageError::InternalError(msg) => {
                ApplicationError::InternalError(msg)
            }
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StorageError::NetworkError("Request timeout".to_string())
        } else if error.is_connect() {
            StorageError::NetworkError(format!("Connection failed: {}", error))
        } else if let Some(status) = error.status() {
            match status.as_u16() {
                404 => StorageError::NotFound(error.to_string()),
                401 | 403 => StorageError::Unauthorized(error.to_string()),
                _ => StorageError::ProviderError(error.to_string()),
            }
        } else {
            StorageError::InternalError(error.to_string())
        }
    }
}

/// Pulls the human readable message out of a vendor error body.
pub fn vendor_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    for key in ["msg", "error_description", "message"] {
        if let Some(message) = value.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }

    match value.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(nested) => nested
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => None,
    }
}

/// Turns a non-success response into a [`StorageError`] carrying the vendor
/// message verbatim.
pub async fn response_error(response: Response) -> StorageError {
    let (status, message) = status_and_message(response).await;

    match status.as_u16() {
        404 => StorageError::NotFound(message),
        401 | 403 => StorageError::Unauthorized(message),
        _ => StorageError::ProviderError(message),
    }
}

/// Like [`response_error`], for identity endpoints: a rejected request there
/// means the credentials or token were refused.
pub async fn auth_response_error(response: Response) -> StorageError {
    let (status, message) = status_and_message(response).await;

    match status.as_u16() {
        400 | 401 | 403 | 422 => StorageError::Unauthorized(message),
        404 => StorageError::NotFound(message),
        _ => StorageError::ProviderError(message),
    }
}

async fn status_and_message(response: Response) -> (reqwest::StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = vendor_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            format!("Request failed with status: {}", status)
        } else {
            body
        }
    });

    (status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_supabase_messages() {
        assert_eq!(
            vendor_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            vendor_message(r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#),
            Some("Object not found".to_string())
        );
        assert_eq!(
            vendor_message(r#"{"msg":"User already registered"}"#),
            Some("User already registered".to_string())
        );
    }

    #[test]
    fn extracts_nested_google_messages() {
        assert_eq!(
            vendor_message(r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#),
            Some("EMAIL_EXISTS".to_string())
        );
    }

    #[test]
    fn plain_text_bodies_are_not_json() {
        assert_eq!(vendor_message("Bad Gateway"), None);
    }

    #[test]
    fn messages_survive_conversion() {
        let error: ApplicationError = StorageError::ProviderError("Bucket not found".to_string()).into();
        assert_eq!(error.to_string(), "Bucket not found");

        let error: ApplicationError = StorageError::Unauthorized("INVALID_PASSWORD".to_string()).into();
        assert!(matches!(error, ApplicationError::AuthFailed(ref m) if m == "INVALID_PASSWORD"));
    }
}

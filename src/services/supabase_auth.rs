use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    application::{error::ApplicationError, services::auth_service::AuthService},
    domain::{
        config::secrets::SupabaseSecrets,
        models::user::{AuthSession, SignUpOutcome, UserIdentity},
    },
    services::{
        error::{auth_response_error, StorageError},
        session_store::SessionStore,
        token_claims,
    },
};

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
}

impl From<SupabaseUser> for UserIdentity {
    fn from(user: SupabaseUser) -> Self {
        UserIdentity {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: SupabaseUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        AuthSession {
            expires_at: token_claims::expires_at(&token.access_token, token.expires_in),
            user: token.user.into(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        }
    }
}

/// Sign-up answers with a full session when e-mail confirmation is off and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(SupabaseUser),
}

pub struct SupabaseAuthService {
    client: Client,
    auth_url: String,
    anon_key: String,
    sessions: Arc<SessionStore>,
}

impl SupabaseAuthService {
    pub fn new(secrets: &SupabaseSecrets, sessions: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            auth_url: format!("{}/auth/v1", secrets.url.trim_end_matches('/')),
            anon_key: secrets.anon_key.clone(),
            sessions,
        }
    }

    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    async fn request_token(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, StorageError> {
        let url = format!("{}/token?grant_type={}", self.auth_url, grant_type);
        let response = self
            .authorized(self.client.post(&url), None)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_response_error(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        Ok(token.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, StorageError> {
        self.request_token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }
}

#[async_trait]
impl AuthService for SupabaseAuthService {
    async fn current_user(&self) -> Option<UserIdentity> {
        let session = self.sessions.session()?;
        if !session.is_expired(Utc::now()) {
            return Some(session.user);
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            info!(user_id = %session.user.id, "Session expired");
            self.sessions.clear();
            return None;
        };

        match self.refresh(refresh_token).await {
            Ok(refreshed) => {
                let user = refreshed.user.clone();
                self.sessions.set(refreshed);
                Some(user)
            }
            Err(e) => {
                warn!(user_id = %session.user.id, "Failed to refresh session: {}", e);
                self.sessions.clear();
                None
            }
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.sessions.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, ApplicationError> {
        let session = self
            .request_token("password", json!({ "email": email, "password": password }))
            .await?;

        let user = session.user.clone();
        self.sessions.set(session);
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ApplicationError> {
        let url = format!("{}/signup", self.auth_url);
        let response = self
            .authorized(self.client.post(&url), None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(StorageError::from)?;

        if !response.status().is_success() {
            return Err(auth_response_error(response).await.into());
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        match body {
            SignUpResponse::Session(token) => {
                let session: AuthSession = token.into();
                let user = session.user.clone();
                self.sessions.set(session);
                Ok(SignUpOutcome {
                    user,
                    signed_in: true,
                })
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome {
                user: user.into(),
                signed_in: false,
            }),
        }
    }

    async fn sign_out(&self) -> Result<(), ApplicationError> {
        let Some(token) = self.sessions.access_token() else {
            return Ok(());
        };
        self.sessions.clear();

        let url = format!("{}/logout", self.auth_url);
        let response = self
            .authorized(self.client.post(&url), Some(&token))
            .send()
            .await
            .map_err(StorageError::from)?;

        if !response.status().is_success() {
            return Err(auth_response_error(response).await.into());
        }

        Ok(())
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    application::{error::ApplicationError, services::auth_service::AuthService},
    domain::{
        config::secrets::FirebaseSecrets,
        models::user::{AuthSession, SignUpOutcome, UserIdentity},
    },
    services::{
        error::{auth_response_error, StorageError},
        session_store::SessionStore,
        token_claims,
    },
};

/// Identity Toolkit answer to both sign-in and sign-up.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

impl AccountResponse {
    fn into_session(self, fallback_email: &str) -> AuthSession {
        let expires_in = self.expires_in.as_deref().and_then(|s| s.parse().ok());

        AuthSession {
            user: UserIdentity {
                id: self.local_id,
                email: self.email.unwrap_or_else(|| fallback_email.to_string()),
            },
            expires_at: token_claims::expires_at(&self.id_token, expires_in),
            access_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

pub struct FirebaseAuthService {
    client: Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    sessions: Arc<SessionStore>,
}

impl FirebaseAuthService {
    pub fn new(secrets: &FirebaseSecrets, sessions: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            api_key: secrets.api_key.clone(),
            identity_url: format!("{}/v1", secrets.identity_base_url.trim_end_matches('/')),
            token_url: format!("{}/v1/token", secrets.token_base_url.trim_end_matches('/')),
            sessions,
        }
    }

    async fn account_request(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, StorageError> {
        let url = format!("{}/accounts:{}", self.identity_url, method);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_response_error(response).await);
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        Ok(account.into_session(email))
    }

    async fn refresh(&self, session: &AuthSession, refresh_token: &str) -> Result<AuthSession, StorageError> {
        let response = self
            .client
            .post(&self.token_url)
            .query(&[("key", &self.api_key)])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_response_error(response).await);
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        let expires_in = refreshed.expires_in.as_deref().and_then(|s| s.parse().ok());
        Ok(AuthSession {
            user: session.user.clone(),
            expires_at: token_claims::expires_at(&refreshed.id_token, expires_in),
            access_token: refreshed.id_token,
            refresh_token: refreshed
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
        })
    }
}

#[async_trait]
impl AuthService for FirebaseAuthService {
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

        match self.refresh(&session, refresh_token).await {
            Ok(refreshed) => {
                self.sessions.set(refreshed);
                Some(session.user)
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
            .account_request("signInWithPassword", email, password)
            .await?;

        let user = session.user.clone();
        self.sessions.set(session);
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ApplicationError> {
        let session = self.account_request("signUp", email, password).await?;

        let user = session.user.clone();
        self.sessions.set(session);
        Ok(SignUpOutcome {
            user,
            signed_in: true,
        })
    }

    // Firebase ID tokens are stateless; signing out only forgets them.
    async fn sign_out(&self) -> Result<(), ApplicationError> {
        self.sessions.clear();
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

impl UserIdentity {
    /// Name shown in the header: the local part of the e-mail address.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Signed-in session as handed out by the auth collaborator.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserIdentity,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of a sign-up. Some providers sign the user in immediately, others
/// wait for an e-mail confirmation first.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: UserIdentity,
    pub signed_in: bool,
}

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{
    application::error::ApplicationError,
    domain::models::user::{SignUpOutcome, UserIdentity},
};

#[async_trait]
pub trait AuthService: Send + Sync {
    /// The signed-in user, if any. An expired session is refreshed when a
    /// refresh token is available and dropped otherwise.
    async fn current_user(&self) -> Option<UserIdentity>;

    /// Receiver that observes every change of the signed-in user.
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, ApplicationError>;

    async fn sign_up(&self, email: &str, password: &str)
        -> Result<SignUpOutcome, ApplicationError>;

    async fn sign_out(&self) -> Result<(), ApplicationError>;
}

use tokio::sync::watch;

use crate::domain::models::user::{AuthSession, UserIdentity};

/// The one signed-in session of this service instance. Shared between a
/// backend's auth and storage halves so storage requests carry the user's
/// bearer token.
#[derive(Debug)]
pub struct SessionStore {
    session: watch::Sender<Option<AuthSession>>,
    user: watch::Sender<Option<UserIdentity>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        let (user, _) = watch::channel(None);
        Self { session, user }
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.borrow().clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.user.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn set(&self, session: AuthSession) {
        let user = session.user.clone();
        self.session.send_replace(Some(session));
        self.publish_user(Some(user));
    }

    pub fn clear(&self) {
        self.session.send_replace(None);
        self.publish_user(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.user.subscribe()
    }

    // Token refreshes replace the session but keep the user; subscribers only
    // hear about actual sign-in and sign-out.
    fn publish_user(&self, user: Option<UserIdentity>) {
        self.user.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user;
                true
            }
        });
    }
}

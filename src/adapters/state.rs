use std::sync::Arc;

use axum::extract::FromRef;

use crate::{application::drive_session::DriveSession, domain::config::local::LocalConfig};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub local_config: Arc<LocalConfig>,
    pub drive: Arc<DriveSession>,
}

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::application::{drive_session::DriveSession, error::ApplicationError};

/// Rejects the request unless a user is signed in.
pub async fn require_session(
    State(drive): State<Arc<DriveSession>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match drive.current_user().await {
        Some(_) => next.run(request).await,
        None => {
            warn!(path = %request.uri().path(), "Request without a signed-in user");
            ApplicationError::login_required().into_response()
        }
    }
}

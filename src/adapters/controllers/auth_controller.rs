use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::{
    adapters::dto::auth_dto::{
        LoginRequest, SessionResponse, SignUpRequest, SignUpResponse, UserResponse,
        SIGNUP_CONFIRMATION_MESSAGE,
    },
    application::{drive_session::DriveSession, error::ApplicationError},
};

pub struct AuthController;

impl AuthController {
    /// POST /api/v1/auth/login
    pub async fn login(
        State(drive): State<Arc<DriveSession>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Json<UserResponse>, ApplicationError> {
        info!("Login requested for {}", body.email);

        let user = drive.sign_in(&body.email, &body.password).await?;
        Ok(Json(user.into()))
    }

    /// POST /api/v1/auth/signup
    pub async fn signup(
        State(drive): State<Arc<DriveSession>>,
        Json(body): Json<SignUpRequest>,
    ) -> Result<(StatusCode, Json<SignUpResponse>), ApplicationError> {
        info!("Signup requested for {}", body.email);

        let outcome = drive
            .sign_up(&body.email, &body.password, &body.confirm_password)
            .await?;

        let message = if outcome.signed_in {
            None
        } else {
            Some(SIGNUP_CONFIRMATION_MESSAGE.to_string())
        };

        Ok((
            StatusCode::CREATED,
            Json(SignUpResponse {
                user: outcome.user.into(),
                signed_in: outcome.signed_in,
                message,
            }),
        ))
    }

    /// POST /api/v1/auth/logout
    pub async fn logout(State(drive): State<Arc<DriveSession>>) -> Result<StatusCode, ApplicationError> {
        drive.sign_out().await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// GET /api/v1/auth/me
    pub async fn me(State(drive): State<Arc<DriveSession>>) -> Json<SessionResponse> {
        let user = drive.current_user().await;

        Json(SessionResponse {
            authenticated: user.is_some(),
            user: user.map(UserResponse::from),
        })
    }
}

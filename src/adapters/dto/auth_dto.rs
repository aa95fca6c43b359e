use serde::{Deserialize, Serialize};

use crate::domain::models::user::UserIdentity;

pub const SIGNUP_CONFIRMATION_MESSAGE: &str =
    "Signup successful! Check your email for confirmation.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl From<UserIdentity> for UserResponse {
    fn from(user: UserIdentity) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: UserResponse,
    #[serde(rename = "signedIn")]
    pub signed_in: bool,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<UserResponse>,
}

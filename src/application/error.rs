use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Resource not found")]
    NotFound,

    #[error("{0}")]
    InternalError(String),

    #[error("{0}")]
    DatabaseError(String),

    #[error("{0}")]
    BadRequest(String),

    /// No authenticated session; the message is shown to the user as-is.
    #[error("{0}")]
    Unauthorized(String),

    /// The auth collaborator rejected the request (bad credentials, taken
    /// e-mail, ...). Carries the vendor message verbatim.
    #[error("{0}")]
    AuthFailed(String),

    /// Storage or metadata collaborator error, vendor message verbatim.
    #[error("{0}")]
    ProviderError(String),

    #[error("Please select files to upload")]
    EmptyQueue,

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Please confirm the deletion of this file")]
    ConfirmationRequired,
}

impl ApplicationError {
    pub fn login_required() -> Self {
        ApplicationError::Unauthorized("Please login to continue".to_string())
    }
}

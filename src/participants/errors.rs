//! # Lifecycle Errors

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::uploads::UploadError;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Rejected form input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("A photo must be uploaded")]
    MissingPhoto,

    /// The administrator address cannot be registered
    #[error("Email is not available")]
    ReservedEmail,

    #[error("Invalid value for field: {0}")]
    InvalidField(String),
}

/// Failures of participant lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The session's participant row no longer exists
    #[error("Participant not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The configured store timeout elapsed
    #[error("Store call timed out")]
    Timeout,
}

impl LifecycleError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            LifecycleError::Validation(_) => 400,
            LifecycleError::Auth(e) => e.status_code(),
            LifecycleError::NotFound => 404,
            LifecycleError::Store(_) => 500,
            LifecycleError::Upload(_) => 500,
            LifecycleError::Timeout => 500,
        }
    }
}

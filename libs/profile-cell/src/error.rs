use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("A user with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Not allowed to view this profile")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProfileError::EmailAlreadyExists { .. } => AppError::Conflict(err.to_string()),
            ProfileError::Forbidden => AppError::Forbidden(err.to_string()),
            ProfileError::Validation(msg) => AppError::ValidationError(msg),
            ProfileError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum EligibilityError {
    #[error("Region not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<EligibilityError> for AppError {
    fn from(err: EligibilityError) -> Self {
        match err {
            EligibilityError::NotFound(id) => AppError::NotFound(format!("Region not found: {}", id)),
            EligibilityError::Validation(msg) => AppError::ValidationError(msg),
            EligibilityError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

use thiserror::Error;

use consultation_cell::ConsultationError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Consultation(#[from] ConsultationError),

    #[error("Only the consultation participants can use this chat")]
    NotParticipant,

    #[error("{0}")]
    Validation(String),

    #[error("Consultation {0} is already finished")]
    Closed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Consultation(e) => e.into(),
            ChatError::NotParticipant => AppError::Forbidden(err.to_string()),
            ChatError::Validation(msg) => AppError::ValidationError(msg),
            ChatError::Closed(_) => AppError::Conflict(err.to_string()),
            ChatError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

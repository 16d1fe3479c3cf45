use thiserror::Error;

use shared_database::SupabaseError;
use shared_models::error::AppError;

use crate::models::ConsultationStatus;

#[derive(Error, Debug)]
pub enum ConsultationError {
    #[error("Consultation request not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },

    #[error("Consultation request {id} is no longer {expected}")]
    StatusChanged {
        id: String,
        expected: ConsultationStatus,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound(_) => AppError::NotFound(err.to_string()),
            ConsultationError::Forbidden(msg) => AppError::Forbidden(msg),
            ConsultationError::Validation(msg) => AppError::ValidationError(msg),
            ConsultationError::InvalidTransition { .. }
            | ConsultationError::StatusChanged { .. } => AppError::Conflict(err.to_string()),
            ConsultationError::Storage(e) => match e.downcast_ref::<SupabaseError>() {
                Some(SupabaseError::Auth(msg)) => AppError::Auth(msg.clone()),
                Some(SupabaseError::Conflict(msg)) => AppError::Conflict(msg.clone()),
                _ => AppError::Database(e.to_string()),
            },
        }
    }
}

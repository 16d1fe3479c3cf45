use thiserror::Error;

use consultation_cell::ConsultationError;
use eligibility_cell::EligibilityError;
use profile_cell::ProfileError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Consultation(#[from] ConsultationError),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Eligibility(e) => e.into(),
            AdminError::Profile(e) => e.into(),
            AdminError::Consultation(e) => e.into(),
        }
    }
}

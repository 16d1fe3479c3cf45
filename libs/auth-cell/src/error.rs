use thiserror::Error;

use eligibility_cell::EligibilityError;
use profile_cell::ProfileError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotEligible(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Signup rejected by the authentication provider: {0}")]
    Rejected(String),

    #[error("Authentication provider is not configured")]
    ProviderUnavailable,

    #[error("Authentication provider error: {0}")]
    Provider(anyhow::Error),

    #[error("{0}")]
    Token(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::NotEligible(reason) => AppError::BadRequest(reason),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Rejected(_) => AppError::BadRequest(err.to_string()),
            AuthError::ProviderUnavailable => AppError::ServiceUnavailable(err.to_string()),
            AuthError::Provider(_) => AppError::ExternalService(err.to_string()),
            AuthError::Token(msg) => AppError::Auth(msg),
            AuthError::Profile(e) => e.into(),
            AuthError::Eligibility(e) => e.into(),
        }
    }
}

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::ConsultationError;
pub use models::*;
pub use router::consultation_routes;
pub use services::{
    build_consultation_repository, classify_priority, ConsultationLifecycle,
    ConsultationRepository, ConsultationService, LocalConsultationRepository,
    SupabaseConsultationRepository,
};

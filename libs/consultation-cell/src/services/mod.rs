pub mod attachments;
pub mod consultation;
pub mod lifecycle;
pub mod priority;
pub mod repository;

pub use consultation::ConsultationService;
pub use lifecycle::ConsultationLifecycle;
pub use priority::classify_priority;
pub use repository::{
    build_consultation_repository, ConsultationRepository, LocalConsultationRepository,
    SupabaseConsultationRepository,
};

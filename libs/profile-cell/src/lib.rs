pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::ProfileError;
pub use models::*;
pub use router::profile_routes;
pub use services::{
    build_profile_repository, LocalProfileRepository, ProfileRepository, ProfileService,
    SupabaseProfileRepository,
};

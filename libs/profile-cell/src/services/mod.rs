pub mod profile;
pub mod repository;

pub use profile::ProfileService;
pub use repository::{
    build_profile_repository, LocalProfileRepository, ProfileRepository,
    SupabaseProfileRepository,
};

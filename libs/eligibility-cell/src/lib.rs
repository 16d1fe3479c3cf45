pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::EligibilityError;
pub use models::*;
pub use router::eligibility_routes;
pub use services::{check_eligibility, RegionRegistry};

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::AdminError;
pub use models::*;
pub use router::admin_routes;
pub use services::AdminService;

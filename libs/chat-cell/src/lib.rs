pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::ChatError;
pub use models::*;
pub use router::chat_routes;
pub use services::ChatService;

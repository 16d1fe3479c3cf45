use axum::{
    Router,
    routing::get,
};

use admin_cell::admin_routes;
use auth_cell::auth_routes;
use chat_cell::chat_routes;
use consultation_cell::consultation_routes;
use eligibility_cell::eligibility_routes;
use notification_cell::notification_routes;
use profile_cell::profile_routes;

use crate::state::AppServices;

pub fn create_router(services: &AppServices) -> Router {
    let config = services.config.clone();

    Router::new()
        .route("/", get(|| async { "Médicos para Todos API is running!" }))
        .nest("/auth", auth_routes(config.clone(), services.auth.clone()))
        .nest("/eligibility", eligibility_routes(services.regions.clone()))
        .nest("/profiles", profile_routes(config.clone(), services.profiles.clone()))
        .nest("/consultations", consultation_routes(config.clone(), services.consultations.clone()))
        .nest("/notifications", notification_routes(config.clone(), services.notifications.clone()))
        .nest("/chat", chat_routes(config.clone(), services.chat.clone()))
        .nest("/admin", admin_routes(config, services.admin.clone()))
}

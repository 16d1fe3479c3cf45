use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::attachments::MAX_CREATE_BODY_BYTES;
use crate::services::ConsultationService;

pub fn consultation_routes(config: Arc<AppConfig>, service: Arc<ConsultationService>) -> Router {
    Router::new()
        .route("/", get(handlers::list_consultations).post(handlers::create_consultation))
        .route("/available", get(handlers::list_available))
        .route(
            "/{consultation_id}",
            get(handlers::get_consultation).patch(handlers::update_description),
        )
        .route("/{consultation_id}/accept", post(handlers::accept_consultation))
        .route("/{consultation_id}/start", post(handlers::start_consultation))
        .route("/{consultation_id}/finish", post(handlers::finish_consultation))
        .layer(DefaultBodyLimit::max(MAX_CREATE_BODY_BYTES))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}

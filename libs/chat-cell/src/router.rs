use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::ChatService;

pub fn chat_routes(config: Arc<AppConfig>, service: Arc<ChatService>) -> Router {
    Router::new()
        .route(
            "/{consultation_id}/messages",
            get(handlers::get_messages).post(handlers::send_message),
        )
        .route("/{consultation_id}/call", get(handlers::get_call))
        .route("/{consultation_id}/call/start", post(handlers::start_call))
        .route("/{consultation_id}/call/end", post(handlers::end_call))
        .route("/{consultation_id}/call/audio", post(handlers::toggle_audio))
        .route("/{consultation_id}/call/video", post(handlers::toggle_video))
        .route("/{consultation_id}/finish", post(handlers::finish_consultation))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}

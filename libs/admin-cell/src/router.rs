use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::AdminService;

pub fn admin_routes(config: Arc<AppConfig>, service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/regions", get(handlers::list_regions).post(handlers::create_region))
        .route("/regions/{region_id}", delete(handlers::delete_region))
        .route("/regions/{region_id}/toggle", patch(handlers::toggle_region))
        .route("/stats", get(handlers::get_stats))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::RegionRegistry;

/// Public lookup routes, used by the signup form before an account exists.
pub fn eligibility_routes(registry: Arc<RegionRegistry>) -> Router {
    Router::new()
        .route("/check", get(handlers::check_region))
        .route("/regions", get(handlers::list_active_regions))
        .route("/suggestions", get(handlers::region_suggestions))
        .with_state(registry)
}

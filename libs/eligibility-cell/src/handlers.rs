use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{EligibilityQuery, EligibilityResult};
use crate::services::RegionRegistry;

#[axum::debug_handler]
pub async fn check_region(
    State(registry): State<Arc<RegionRegistry>>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityResult>, AppError> {
    let region = query.regiao.unwrap_or_default();
    let result = registry.check(&region).await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn list_active_regions(
    State(registry): State<Arc<RegionRegistry>>,
) -> Result<Json<Value>, AppError> {
    let regions = registry.active().await?;

    Ok(Json(json!({
        "total": regions.len(),
        "regions": regions
    })))
}

#[axum::debug_handler]
pub async fn region_suggestions(
    State(registry): State<Arc<RegionRegistry>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(registry.suggestions().await?))
}

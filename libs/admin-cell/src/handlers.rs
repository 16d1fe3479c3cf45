use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};

use eligibility_cell::{CreateRegionRequest, EligibleRegion};
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::AdminStats;
use crate::services::AdminService;

#[axum::debug_handler]
pub async fn list_regions(
    State(service): State<Arc<AdminService>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[UserRole::Admin])?;

    let regions = service.regions().await?;
    Ok(Json(json!({
        "total": regions.len(),
        "regions": regions
    })))
}

#[axum::debug_handler]
pub async fn create_region(
    State(service): State<Arc<AdminService>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateRegionRequest>,
) -> Result<(StatusCode, Json<EligibleRegion>), AppError> {
    require_role(&user, &[UserRole::Admin])?;

    let region = service.add_region(&user, request).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

#[axum::debug_handler]
pub async fn delete_region(
    State(service): State<Arc<AdminService>>,
    Extension(user): Extension<User>,
    Path(region_id): Path<String>,
) -> Result<Json<EligibleRegion>, AppError> {
    require_role(&user, &[UserRole::Admin])?;

    Ok(Json(service.remove_region(&user, &region_id).await?))
}

#[axum::debug_handler]
pub async fn toggle_region(
    State(service): State<Arc<AdminService>>,
    Extension(user): Extension<User>,
    Path(region_id): Path<String>,
) -> Result<Json<EligibleRegion>, AppError> {
    require_role(&user, &[UserRole::Admin])?;

    Ok(Json(service.toggle_region(&user, &region_id).await?))
}

#[axum::debug_handler]
pub async fn get_stats(
    State(service): State<Arc<AdminService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<AdminStats>, AppError> {
    require_role(&user, &[UserRole::Admin])?;

    Ok(Json(service.stats(auth.token()).await?))
}

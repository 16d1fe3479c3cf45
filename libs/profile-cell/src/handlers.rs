use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};

use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::UserProfile;
use crate::services::ProfileService;

#[axum::debug_handler]
pub async fn get_profile(
    State(service): State<Arc<ProfileService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(profile_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = service.get_for_viewer(&user, &profile_id, auth.token()).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(service): State<Arc<ProfileService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[UserRole::Patient, UserRole::Doctor, UserRole::Admin])?;

    let doctors = service.list_by_role(UserRole::Doctor, Some(auth.token())).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

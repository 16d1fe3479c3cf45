use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{NotificationList, NotificationView};
use crate::services::NotificationService;

#[axum::debug_handler]
pub async fn list_notifications(
    State(service): State<Arc<NotificationService>>,
    Extension(user): Extension<User>,
) -> Result<Json<NotificationList>, AppError> {
    Ok(Json(service.list_for(&user).await?))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(service): State<Arc<NotificationService>>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationView>, AppError> {
    Ok(Json(service.mark_read(&user, &notification_id).await?))
}

#[axum::debug_handler]
pub async fn mark_all_read(
    State(service): State<Arc<NotificationService>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let updated = service.mark_all_read(&user).await?;
    Ok(Json(json!({ "updated": updated })))
}

#[axum::debug_handler]
pub async fn dismiss(
    State(service): State<Arc<NotificationService>>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service.dismiss(&user, &notification_id).await?;
    Ok(Json(json!({ "success": true })))
}

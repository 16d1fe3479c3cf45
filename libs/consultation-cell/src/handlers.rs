use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    ConsultationList, ConsultationRequest, CreateConsultationRequest, UpdateDescriptionRequest,
};
use crate::services::ConsultationService;

#[axum::debug_handler]
pub async fn create_consultation(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<ConsultationRequest>), AppError> {
    let created = service.create(&user, request, auth.token()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn list_consultations(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<ConsultationList>, AppError> {
    let consultations = service.list(&user, auth.token()).await?;
    Ok(Json(consultations.into()))
}

#[axum::debug_handler]
pub async fn list_available(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<ConsultationList>, AppError> {
    let consultations = service.available(&user, auth.token()).await?;
    Ok(Json(consultations.into()))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<ConsultationRequest>, AppError> {
    Ok(Json(service.get(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn update_description(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
    Json(request): Json<UpdateDescriptionRequest>,
) -> Result<Json<ConsultationRequest>, AppError> {
    let updated = service
        .update_description(&user, &consultation_id, &request.description, auth.token())
        .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn accept_consultation(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<ConsultationRequest>, AppError> {
    Ok(Json(service.accept(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn start_consultation(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<ConsultationRequest>, AppError> {
    Ok(Json(service.start(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn finish_consultation(
    State(service): State<Arc<ConsultationService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<ConsultationRequest>, AppError> {
    Ok(Json(service.finish(&user, &consultation_id, auth.token()).await?))
}

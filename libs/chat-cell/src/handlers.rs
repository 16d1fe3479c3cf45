use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use consultation_cell::ConsultationRequest;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CallState, ChatMessage, ChatTranscript, SendMessageRequest};
use crate::services::ChatService;

#[axum::debug_handler]
pub async fn get_messages(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<ChatTranscript>, AppError> {
    Ok(Json(service.messages(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn send_message(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let message = service
        .send(&user, &consultation_id, &request.content, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn get_call(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<CallState>, AppError> {
    Ok(Json(service.call_state(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn start_call(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<CallState>, AppError> {
    Ok(Json(service.start_call(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn end_call(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<CallState>, AppError> {
    Ok(Json(service.end_call(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn toggle_audio(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<CallState>, AppError> {
    Ok(Json(service.toggle_audio(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn toggle_video(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<CallState>, AppError> {
    Ok(Json(service.toggle_video(&user, &consultation_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn finish_consultation(
    State(service): State<Arc<ChatService>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<ConsultationRequest>, AppError> {
    Ok(Json(service.finish(&user, &consultation_id, auth.token()).await?))
}

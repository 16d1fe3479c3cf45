use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use consultation_cell::{ConsultationRequest, ConsultationService, ConsultationStatus};
use shared_database::LocalStore;
use shared_models::auth::User;

use crate::error::ChatError;
use crate::models::{CallState, ChatMessage, ChatTranscript, MessageKind, MessageSender};

pub const MAX_MESSAGE_CHARS: usize = 2000;

const WELCOME_MESSAGE: &str = "Consulta iniciada";
const CALL_STARTED_MESSAGE: &str = "Videochamada iniciada";
const CALL_ENDED_MESSAGE: &str = "Videochamada encerrada";
const FINISHED_MESSAGE: &str = "Consulta finalizada - Obrigado por usar o Medicina para Todos!";

fn messages_key(consultation_id: &str) -> String {
    format!("chat:{}", consultation_id)
}

fn call_key(consultation_id: &str) -> String {
    format!("chamada:{}", consultation_id)
}

fn system_message(consultation_id: &str, content: &str) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4().to_string(),
        consultation_id: consultation_id.to_string(),
        sender: MessageSender::System,
        sender_id: None,
        content: content.to_string(),
        kind: MessageKind::System,
        timestamp: Utc::now(),
    }
}

pub struct ChatService {
    store: Arc<LocalStore>,
    consultations: Arc<ConsultationService>,
}

impl ChatService {
    pub fn new(store: Arc<LocalStore>, consultations: Arc<ConsultationService>) -> Self {
        Self { store, consultations }
    }

    /// The first read opens the conversation with a system message.
    pub async fn messages(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<ChatTranscript, ChatError> {
        let consultation = self.participant_view(user, consultation_id, auth_token).await?;
        let stored: Vec<ChatMessage> = self.store.get_or_default(&messages_key(consultation_id)).await?;
        let messages = if stored.is_empty() {
            self.append(consultation_id, None).await?
        } else {
            stored
        };

        Ok(ChatTranscript {
            consultation_id: consultation.id,
            status: consultation.status,
            messages,
        })
    }

    pub async fn send(
        &self,
        user: &User,
        consultation_id: &str,
        content: &str,
        auth_token: &str,
    ) -> Result<ChatMessage, ChatError> {
        let consultation = self.open_consultation(user, consultation_id, auth_token).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::Validation("Message cannot be empty".to_string()));
        }
        if content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::Validation(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let sender = if consultation.patient_id == user.id {
            MessageSender::Patient
        } else {
            MessageSender::Doctor
        };

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            consultation_id: consultation_id.to_string(),
            sender,
            sender_id: Some(user.id.clone()),
            content: content.to_string(),
            kind: MessageKind::Text,
            timestamp: Utc::now(),
        };

        self.append(consultation_id, Some(message.clone())).await?;
        debug!("Message {} posted to consultation {}", message.id, consultation_id);
        Ok(message)
    }

    pub async fn call_state(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<CallState, ChatError> {
        self.participant_view(user, consultation_id, auth_token).await?;
        Ok(self.store.get_or_default(&call_key(consultation_id)).await?)
    }

    pub async fn start_call(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<CallState, ChatError> {
        self.open_consultation(user, consultation_id, auth_token).await?;

        let (state, changed) = self.update_call(consultation_id, |call| {
            let changed = !call.call_active;
            call.call_active = true;
            changed
        }).await?;

        if changed {
            info!("Video call started for consultation {}", consultation_id);
            self.append(consultation_id, Some(system_message(consultation_id, CALL_STARTED_MESSAGE))).await?;
        }
        Ok(state)
    }

    pub async fn end_call(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<CallState, ChatError> {
        self.participant_view(user, consultation_id, auth_token).await?;
        self.hang_up(consultation_id).await
    }

    pub async fn toggle_audio(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<CallState, ChatError> {
        self.participant_view(user, consultation_id, auth_token).await?;
        let (state, _) = self.update_call(consultation_id, |call| {
            call.audio_enabled = !call.audio_enabled;
        }).await?;
        Ok(state)
    }

    pub async fn toggle_video(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<CallState, ChatError> {
        self.participant_view(user, consultation_id, auth_token).await?;
        let (state, _) = self.update_call(consultation_id, |call| {
            call.video_enabled = !call.video_enabled;
        }).await?;
        Ok(state)
    }

    /// Closes the consultation, hangs up any running call and leaves a
    /// farewell in the transcript.
    pub async fn finish(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ChatError> {
        self.participant_view(user, consultation_id, auth_token).await?;

        let finished = self.consultations.finish(user, consultation_id, auth_token).await?;
        self.hang_up(consultation_id).await?;
        self.append(consultation_id, Some(system_message(consultation_id, FINISHED_MESSAGE))).await?;

        Ok(finished)
    }

    async fn participant_view(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ChatError> {
        let consultation = self.consultations.get(user, consultation_id, auth_token).await?;
        if !consultation.is_participant(&user.id) {
            return Err(ChatError::NotParticipant);
        }
        Ok(consultation)
    }

    async fn open_consultation(
        &self,
        user: &User,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ChatError> {
        let consultation = self.participant_view(user, consultation_id, auth_token).await?;
        if consultation.status == ConsultationStatus::Finished {
            return Err(ChatError::Closed(consultation.id));
        }
        Ok(consultation)
    }

    /// Seeds the welcome message on an empty transcript, then appends `message`.
    async fn append(
        &self,
        consultation_id: &str,
        message: Option<ChatMessage>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = self
            .store
            .update::<Vec<ChatMessage>, _, _>(&messages_key(consultation_id), |messages| {
                if messages.is_empty() {
                    messages.push(system_message(consultation_id, WELCOME_MESSAGE));
                }
                if let Some(message) = message {
                    messages.push(message);
                }
                messages.clone()
            })
            .await?;
        Ok(messages)
    }

    async fn update_call<R, F>(&self, consultation_id: &str, f: F) -> Result<(CallState, R), ChatError>
    where
        F: FnOnce(&mut CallState) -> R,
    {
        let result = self
            .store
            .update::<CallState, _, _>(&call_key(consultation_id), |call| {
                let result = f(call);
                call.updated_at = Utc::now();
                (call.clone(), result)
            })
            .await?;
        Ok(result)
    }

    async fn hang_up(&self, consultation_id: &str) -> Result<CallState, ChatError> {
        let (state, was_active) = self.update_call(consultation_id, |call| {
            let was_active = call.call_active;
            call.call_active = false;
            was_active
        }).await?;

        if was_active {
            info!("Video call ended for consultation {}", consultation_id);
            self.append(consultation_id, Some(system_message(consultation_id, CALL_ENDED_MESSAGE))).await?;
        }
        Ok(state)
    }
}

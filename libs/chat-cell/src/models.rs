use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consultation_cell::ConsultationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSender {
    #[serde(rename = "medico")]
    Doctor,
    #[serde(rename = "paciente")]
    Patient,
    #[serde(rename = "sistema")]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "texto")]
    Text,
    #[serde(rename = "sistema")]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub consultation_id: String,
    pub sender: MessageSender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub content: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

/// Media toggles of the video call attached to a consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallState {
    pub call_active: bool,
    pub video_enabled: bool,
    pub audio_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for CallState {
    fn default() -> Self {
        Self {
            call_active: false,
            video_enabled: true,
            audio_enabled: true,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    #[serde(alias = "conteudo")]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub consultation_id: String,
    pub status: ConsultationStatus,
    pub messages: Vec<ChatMessage>,
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "baixa")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "baixa",
            Priority::Medium => "media",
            Priority::High => "alta",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsultationStatus {
    #[serde(rename = "nova")]
    New,
    #[serde(rename = "aceita")]
    Accepted,
    #[serde(rename = "em_atendimento")]
    InProgress,
    #[serde(rename = "finalizada")]
    Finished,
}

impl ConsultationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::New => "nova",
            ConsultationStatus::Accepted => "aceita",
            ConsultationStatus::InProgress => "em_atendimento",
            ConsultationStatus::Finished => "finalizada",
        }
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side closed the consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishedBy {
    #[serde(rename = "paciente")]
    Patient,
    #[serde(rename = "medico")]
    Doctor,
}

/// Row of `arquivos_solicitacao`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "solicitacao_id")]
    pub consultation_id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub mime_type: String,
    /// Base64 payload.
    #[serde(rename = "dados")]
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAttachment {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "tipo", default = "default_mime_type")]
    pub mime_type: String,
    /// Base64, optionally wrapped in a `data:` URL.
    #[serde(alias = "dados")]
    pub data: String,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

/// Row of `solicitacoes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub id: String,
    #[serde(rename = "paciente_id")]
    pub patient_id: String,
    #[serde(rename = "paciente_nome")]
    pub patient_name: String,
    #[serde(rename = "paciente_email", default)]
    pub patient_email: Option<String>,
    #[serde(rename = "paciente_regiao", default)]
    pub patient_region: Option<String>,
    #[serde(rename = "paciente_idade", default)]
    pub patient_age: Option<u32>,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "prioridade")]
    pub priority: Priority,
    pub status: ConsultationStatus,
    #[serde(rename = "medico_id", default)]
    pub doctor_id: Option<String>,
    #[serde(rename = "medico_nome", default)]
    pub doctor_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "aceita_em", default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(rename = "iniciada_em", default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finalizada_em", default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(rename = "finalizada_por", default)]
    pub finished_by: Option<FinishedBy>,
    #[serde(rename = "arquivos", alias = "arquivos_solicitacao", default)]
    pub attachments: Vec<Attachment>,
}

impl ConsultationRequest {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.patient_id == user_id || self.doctor_id.as_deref() == Some(user_id)
    }

    pub fn apply(&mut self, update: &ConsultationUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(doctor_id) = &update.doctor_id {
            self.doctor_id = Some(doctor_id.clone());
        }
        if let Some(doctor_name) = &update.doctor_name {
            self.doctor_name = Some(doctor_name.clone());
        }
        if update.accepted_at.is_some() {
            self.accepted_at = update.accepted_at;
        }
        if update.started_at.is_some() {
            self.started_at = update.started_at;
        }
        if update.finished_at.is_some() {
            self.finished_at = update.finished_at;
        }
        if update.finished_by.is_some() {
            self.finished_by = update.finished_by;
        }
    }
}

/// Partial row sent as a PATCH body; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsultationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConsultationStatus>,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "prioridade", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "medico_id", skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(rename = "medico_nome", skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(rename = "aceita_em", skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(rename = "iniciada_em", skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finalizada_em", skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(rename = "finalizada_por", skip_serializing_if = "Option::is_none")]
    pub finished_by: Option<FinishedBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsultationFilter {
    All,
    Patient(String),
    Doctor(String),
    Status(ConsultationStatus),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConsultationRequest {
    #[serde(alias = "descricao")]
    pub description: String,
    #[serde(alias = "arquivos", default)]
    pub attachments: Vec<NewAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDescriptionRequest {
    #[serde(alias = "descricao")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationList {
    pub total: usize,
    pub consultations: Vec<ConsultationRequest>,
}

impl From<Vec<ConsultationRequest>> for ConsultationList {
    fn from(consultations: Vec<ConsultationRequest>) -> Self {
        Self {
            total: consultations.len(),
            consultations,
        }
    }
}

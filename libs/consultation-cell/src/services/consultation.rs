use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use notification_cell::{NotificationKind, NotificationService};
use profile_cell::{ProfileService, UserProfile};
use shared_models::auth::{User, UserRole};

use crate::error::ConsultationError;
use crate::models::{
    Attachment, ConsultationFilter, ConsultationRequest, ConsultationStatus, ConsultationUpdate,
    CreateConsultationRequest, FinishedBy,
};
use crate::services::attachments::{base64_payload, validate_attachments};
use crate::services::lifecycle::ConsultationLifecycle;
use crate::services::priority::classify_priority;
use crate::services::repository::ConsultationRepository;

pub const MAX_DESCRIPTION_CHARS: usize = 5000;

pub struct ConsultationService {
    repository: Arc<dyn ConsultationRepository>,
    profiles: Arc<ProfileService>,
    notifications: Arc<NotificationService>,
    lifecycle: ConsultationLifecycle,
}

impl ConsultationService {
    pub fn new(
        repository: Arc<dyn ConsultationRepository>,
        profiles: Arc<ProfileService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            repository,
            profiles,
            notifications,
            lifecycle: ConsultationLifecycle::new(),
        }
    }

    pub async fn create(
        &self,
        user: &User,
        request: CreateConsultationRequest,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        require(user, &[UserRole::Patient], "Only patients can request a consultation")?;

        let description = validate_description(&request.description)?;
        validate_attachments(&request.attachments)?;

        let profile = self.profile_of(user, auth_token).await;
        let id = Uuid::new_v4().to_string();

        let attachments = request
            .attachments
            .into_iter()
            .map(|file| Attachment {
                id: Uuid::new_v4().to_string(),
                consultation_id: id.clone(),
                name: file.name.trim().to_string(),
                mime_type: file.mime_type,
                data: base64_payload(&file.data).trim().to_string(),
            })
            .collect();

        let consultation = ConsultationRequest {
            id,
            patient_id: user.id.clone(),
            patient_name: profile
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| user.display_name()),
            patient_email: profile
                .as_ref()
                .map(|p| p.email.clone())
                .or_else(|| user.email.clone()),
            patient_region: profile.as_ref().and_then(|p| p.region.clone()),
            patient_age: profile.as_ref().and_then(|p| p.age),
            priority: classify_priority(&description),
            description,
            status: ConsultationStatus::New,
            doctor_id: None,
            doctor_name: None,
            created_at: Utc::now(),
            accepted_at: None,
            started_at: None,
            finished_at: None,
            finished_by: None,
            attachments,
        };

        let created = self.repository.insert(consultation, Some(auth_token)).await?;
        info!(
            "Consultation request {} created by {} with priority {}",
            created.id, created.patient_id, created.priority
        );

        if let Err(e) = self.notifications
            .notify_role(
                UserRole::Doctor,
                "Nova solicitação disponível!",
                &format!("{} precisa de atendimento médico.", created.patient_name),
                NotificationKind::Info,
            )
            .await
        {
            warn!("Failed to notify doctors about {}: {}", created.id, e);
        }

        Ok(created)
    }

    /// Visible to the owning patient, the assigned doctor, any doctor while
    /// the request is still open, and admins.
    pub async fn get(
        &self,
        user: &User,
        id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        let consultation = self.find(id, auth_token).await?;

        let visible = match user.app_role() {
            Some(UserRole::Admin) => true,
            Some(UserRole::Patient) => consultation.patient_id == user.id,
            Some(UserRole::Doctor) => {
                consultation.status == ConsultationStatus::New
                    || consultation.doctor_id.as_deref() == Some(user.id.as_str())
            }
            None => false,
        };

        if !visible {
            return Err(ConsultationError::Forbidden(
                "Not allowed to view this consultation request".to_string(),
            ));
        }

        Ok(consultation)
    }

    /// Newest first.
    pub async fn list(&self, user: &User, auth_token: &str) -> Result<Vec<ConsultationRequest>, ConsultationError> {
        let filter = match user.app_role() {
            Some(UserRole::Admin) => ConsultationFilter::All,
            Some(UserRole::Patient) => ConsultationFilter::Patient(user.id.clone()),
            Some(UserRole::Doctor) => ConsultationFilter::Doctor(user.id.clone()),
            None => {
                return Err(ConsultationError::Forbidden("User has no application role".to_string()))
            }
        };

        let mut consultations = self.repository.list(filter, Some(auth_token)).await?;
        consultations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(consultations)
    }

    /// Open requests, most urgent first, then oldest first.
    pub async fn available(&self, user: &User, auth_token: &str) -> Result<Vec<ConsultationRequest>, ConsultationError> {
        require(user, &[UserRole::Doctor, UserRole::Admin], "Only doctors can browse open requests")?;

        let mut consultations = self.repository
            .list(ConsultationFilter::Status(ConsultationStatus::New), Some(auth_token))
            .await?;
        consultations.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(consultations)
    }

    /// Every request regardless of caller, for aggregate reporting.
    pub async fn all(&self, auth_token: Option<&str>) -> Result<Vec<ConsultationRequest>, ConsultationError> {
        Ok(self.repository.list(ConsultationFilter::All, auth_token).await?)
    }

    pub async fn update_description(
        &self,
        user: &User,
        id: &str,
        description: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        let consultation = self.find(id, auth_token).await?;

        if consultation.patient_id != user.id {
            return Err(ConsultationError::Forbidden(
                "Only the requesting patient can edit this consultation request".to_string(),
            ));
        }
        if consultation.status != ConsultationStatus::New {
            return Err(ConsultationError::StatusChanged {
                id: consultation.id,
                expected: ConsultationStatus::New,
            });
        }

        let description = validate_description(description)?;
        let update = ConsultationUpdate {
            priority: Some(classify_priority(&description)),
            description: Some(description),
            ..Default::default()
        };

        let updated = self.repository
            .update(id, ConsultationStatus::New, update, Some(auth_token))
            .await?
            .ok_or_else(|| ConsultationError::StatusChanged {
                id: id.to_string(),
                expected: ConsultationStatus::New,
            })?;

        debug!("Consultation request {} description updated", id);
        Ok(updated)
    }

    pub async fn accept(
        &self,
        user: &User,
        id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        require(user, &[UserRole::Doctor], "Only doctors can accept consultation requests")?;

        let consultation = self.find(id, auth_token).await?;
        let doctor_name = self
            .profile_of(user, auth_token)
            .await
            .map(|p| p.name)
            .unwrap_or_else(|| user.display_name());

        let update = ConsultationUpdate {
            status: Some(ConsultationStatus::Accepted),
            doctor_id: Some(user.id.clone()),
            doctor_name: Some(doctor_name.clone()),
            accepted_at: Some(self.lifecycle.transition_stamp(&consultation, Utc::now())),
            ..Default::default()
        };
        let accepted = self.transition(&consultation, ConsultationStatus::Accepted, update, auth_token).await?;
        info!("Consultation request {} accepted by {}", id, user.id);

        self.notify(
            &accepted.patient_id,
            "Solicitação aceita!",
            &format!("{} aceitou sua solicitação e iniciará o atendimento em breve.", doctor_name),
            NotificationKind::Success,
        )
        .await;

        Ok(accepted)
    }

    pub async fn start(
        &self,
        user: &User,
        id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        let consultation = self.find(id, auth_token).await?;

        if consultation.doctor_id.as_deref() != Some(user.id.as_str()) {
            return Err(ConsultationError::Forbidden(
                "Only the assigned doctor can start this consultation".to_string(),
            ));
        }

        let update = ConsultationUpdate {
            status: Some(ConsultationStatus::InProgress),
            started_at: Some(self.lifecycle.transition_stamp(&consultation, Utc::now())),
            ..Default::default()
        };
        let started = self.transition(&consultation, ConsultationStatus::InProgress, update, auth_token).await?;
        info!("Consultation request {} started", id);

        self.notify(
            &started.patient_id,
            "Atendimento iniciado!",
            &format!(
                "{} iniciou seu atendimento. Acesse o chat para conversar.",
                started.doctor_name.as_deref().unwrap_or("Seu médico")
            ),
            NotificationKind::Success,
        )
        .await;

        Ok(started)
    }

    pub async fn finish(
        &self,
        user: &User,
        id: &str,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        let consultation = self.find(id, auth_token).await?;

        let finished_by = if consultation.patient_id == user.id {
            FinishedBy::Patient
        } else if consultation.doctor_id.as_deref() == Some(user.id.as_str()) {
            FinishedBy::Doctor
        } else {
            return Err(ConsultationError::Forbidden(
                "Only the participants can finish this consultation".to_string(),
            ));
        };

        let update = ConsultationUpdate {
            status: Some(ConsultationStatus::Finished),
            finished_at: Some(self.lifecycle.transition_stamp(&consultation, Utc::now())),
            finished_by: Some(finished_by),
            ..Default::default()
        };
        let finished = self.transition(&consultation, ConsultationStatus::Finished, update, auth_token).await?;
        info!("Consultation request {} finished by {:?}", id, finished_by);

        match finished_by {
            FinishedBy::Doctor => {
                self.notify(
                    &finished.patient_id,
                    "Consulta finalizada",
                    &format!(
                        "Sua consulta com {} foi finalizada. Obrigado por usar nossos serviços!",
                        finished.doctor_name.as_deref().unwrap_or("seu médico")
                    ),
                    NotificationKind::Info,
                )
                .await;
            }
            FinishedBy::Patient => {
                if let Some(doctor_id) = &finished.doctor_id {
                    self.notify(
                        doctor_id,
                        "Consulta finalizada pelo paciente",
                        &format!("A consulta com {} foi finalizada.", finished.patient_name),
                        NotificationKind::Info,
                    )
                    .await;
                }
            }
        }

        Ok(finished)
    }

    async fn find(&self, id: &str, auth_token: &str) -> Result<ConsultationRequest, ConsultationError> {
        self.repository
            .find(id, Some(auth_token))
            .await?
            .ok_or_else(|| ConsultationError::NotFound(id.to_string()))
    }

    async fn transition(
        &self,
        current: &ConsultationRequest,
        next: ConsultationStatus,
        update: ConsultationUpdate,
        auth_token: &str,
    ) -> Result<ConsultationRequest, ConsultationError> {
        self.lifecycle.validate_status_transition(current.status, next)?;

        self.repository
            .update(&current.id, current.status, update, Some(auth_token))
            .await?
            .ok_or_else(|| {
                warn!("Consultation request {} changed concurrently", current.id);
                ConsultationError::StatusChanged {
                    id: current.id.clone(),
                    expected: current.status,
                }
            })
    }

    async fn profile_of(&self, user: &User, auth_token: &str) -> Option<UserProfile> {
        match self.profiles.find(&user.id, Some(auth_token)).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Could not load profile for {}: {}", user.id, e);
                None
            }
        }
    }

    async fn notify(&self, user_id: &str, title: &str, message: &str, kind: NotificationKind) {
        if let Err(e) = self.notifications.notify_user(user_id, title, message, kind).await {
            warn!("Failed to notify {}: {}", user_id, e);
        }
    }
}

fn require(user: &User, allowed: &[UserRole], message: &str) -> Result<(), ConsultationError> {
    match user.app_role() {
        Some(role) if allowed.contains(&role) => Ok(()),
        _ => Err(ConsultationError::Forbidden(message.to_string())),
    }
}

fn validate_description(description: &str) -> Result<String, ConsultationError> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ConsultationError::Validation("Description is required".to_string()));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ConsultationError::Validation(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }

    Ok(description.to_string())
}

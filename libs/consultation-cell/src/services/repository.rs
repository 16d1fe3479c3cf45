use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::{AppConfig, StorageBackend};
use shared_database::{LocalStore, SupabaseClient};

use crate::models::{
    Attachment, ConsultationFilter, ConsultationRequest, ConsultationStatus, ConsultationUpdate,
};

const CONSULTATIONS_KEY: &str = "solicitacoes";
const SELECT_WITH_ATTACHMENTS: &str = "select=*,arquivos_solicitacao(*)";

#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    async fn insert(&self, consultation: ConsultationRequest, auth_token: Option<&str>) -> Result<ConsultationRequest>;

    async fn find(&self, id: &str, auth_token: Option<&str>) -> Result<Option<ConsultationRequest>>;

    async fn list(&self, filter: ConsultationFilter, auth_token: Option<&str>) -> Result<Vec<ConsultationRequest>>;

    /// Applies `update` only while the stored status still equals `expected`.
    /// `None` means the record is gone or its status moved on.
    async fn update(
        &self,
        id: &str,
        expected: ConsultationStatus,
        update: ConsultationUpdate,
        auth_token: Option<&str>,
    ) -> Result<Option<ConsultationRequest>>;
}

pub fn build_consultation_repository(
    config: &AppConfig,
    store: Arc<LocalStore>,
) -> Arc<dyn ConsultationRepository> {
    match config.storage_backend {
        StorageBackend::Supabase => Arc::new(SupabaseConsultationRepository::new(config)),
        StorageBackend::Local | StorageBackend::Memory => Arc::new(LocalConsultationRepository::new(store)),
    }
}

/// `solicitacoes` plus its `arquivos_solicitacao` children.
pub struct SupabaseConsultationRepository {
    supabase: SupabaseClient,
}

impl SupabaseConsultationRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<ConsultationRequest>> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl ConsultationRepository for SupabaseConsultationRepository {
    async fn insert(&self, consultation: ConsultationRequest, auth_token: Option<&str>) -> Result<ConsultationRequest> {
        debug!("Inserting consultation request {}", consultation.id);

        let mut row = serde_json::to_value(&consultation)?;
        if let Some(fields) = row.as_object_mut() {
            fields.remove("arquivos");
        }

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/solicitacoes",
            auth_token,
            Some(row),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to create consultation request"))?;
        let mut created: ConsultationRequest = serde_json::from_value(created)?;

        if consultation.attachments.is_empty() {
            return Ok(created);
        }

        let rows: Vec<Value> = consultation
            .attachments
            .iter()
            .map(|attachment| {
                json!({
                    "id": attachment.id,
                    "solicitacao_id": created.id,
                    "nome": attachment.name,
                    "tipo": attachment.mime_type,
                    "dados": attachment.data,
                })
            })
            .collect();

        // Single bulk insert.
        let stored: Result<Vec<Attachment>> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/arquivos_solicitacao",
                auth_token,
                Some(Value::Array(rows)),
                Some(SupabaseClient::representation_headers()),
            )
            .await;

        match stored {
            Ok(stored) => {
                created.attachments = stored;
                Ok(created)
            }
            Err(e) => {
                warn!("Attachments of consultation request {} were rejected, removing it", created.id);
                let path = format!("/rest/v1/solicitacoes?id=eq.{}", urlencoding::encode(&created.id));
                if let Err(cleanup) = self
                    .supabase
                    .request_no_content(Method::DELETE, &path, auth_token, None)
                    .await
                {
                    error!("Failed to remove consultation request {}: {}", created.id, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn find(&self, id: &str, auth_token: Option<&str>) -> Result<Option<ConsultationRequest>> {
        let path = format!(
            "/rest/v1/solicitacoes?id=eq.{}&{}",
            urlencoding::encode(id),
            SELECT_WITH_ATTACHMENTS
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, auth_token, None).await?;

        Ok(Self::parse_rows(result)?.into_iter().next())
    }

    async fn list(&self, filter: ConsultationFilter, auth_token: Option<&str>) -> Result<Vec<ConsultationRequest>> {
        let condition = match &filter {
            ConsultationFilter::All => String::new(),
            ConsultationFilter::Patient(id) => format!("paciente_id=eq.{}&", urlencoding::encode(id)),
            ConsultationFilter::Doctor(id) => format!("medico_id=eq.{}&", urlencoding::encode(id)),
            ConsultationFilter::Status(status) => format!("status=eq.{}&", status),
        };
        let path = format!(
            "/rest/v1/solicitacoes?{}{}&order=created_at.desc",
            condition, SELECT_WITH_ATTACHMENTS
        );

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, auth_token, None).await?;
        Self::parse_rows(result)
    }

    async fn update(
        &self,
        id: &str,
        expected: ConsultationStatus,
        update: ConsultationUpdate,
        auth_token: Option<&str>,
    ) -> Result<Option<ConsultationRequest>> {
        debug!("Updating consultation request {} (expecting {})", id, expected);

        let path = format!(
            "/rest/v1/solicitacoes?id=eq.{}&status=eq.{}&{}",
            urlencoding::encode(id),
            expected,
            SELECT_WITH_ATTACHMENTS
        );
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            auth_token,
            Some(serde_json::to_value(&update)?),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        Ok(Self::parse_rows(result)?.into_iter().next())
    }
}

pub struct LocalConsultationRepository {
    store: Arc<LocalStore>,
}

impl LocalConsultationRepository {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    async fn all(&self) -> Result<Vec<ConsultationRequest>> {
        self.store.get_or_default(CONSULTATIONS_KEY).await
    }
}

#[async_trait]
impl ConsultationRepository for LocalConsultationRepository {
    async fn insert(&self, consultation: ConsultationRequest, _auth_token: Option<&str>) -> Result<ConsultationRequest> {
        let inserted = self
            .store
            .update::<Vec<ConsultationRequest>, _, _>(CONSULTATIONS_KEY, |all| {
                if all.iter().any(|c| c.id == consultation.id) {
                    return false;
                }
                all.push(consultation.clone());
                true
            })
            .await?;

        if !inserted {
            return Err(anyhow!("Consultation request {} already exists", consultation.id));
        }

        Ok(consultation)
    }

    async fn find(&self, id: &str, _auth_token: Option<&str>) -> Result<Option<ConsultationRequest>> {
        Ok(self.all().await?.into_iter().find(|c| c.id == id))
    }

    async fn list(&self, filter: ConsultationFilter, _auth_token: Option<&str>) -> Result<Vec<ConsultationRequest>> {
        let mut consultations: Vec<ConsultationRequest> = self
            .all()
            .await?
            .into_iter()
            .filter(|c| match &filter {
                ConsultationFilter::All => true,
                ConsultationFilter::Patient(id) => &c.patient_id == id,
                ConsultationFilter::Doctor(id) => c.doctor_id.as_ref() == Some(id),
                ConsultationFilter::Status(status) => c.status == *status,
            })
            .collect();
        consultations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(consultations)
    }

    async fn update(
        &self,
        id: &str,
        expected: ConsultationStatus,
        update: ConsultationUpdate,
        _auth_token: Option<&str>,
    ) -> Result<Option<ConsultationRequest>> {
        self.store
            .update::<Vec<ConsultationRequest>, _, _>(CONSULTATIONS_KEY, |all| {
                let consultation = all
                    .iter_mut()
                    .find(|c| c.id == id && c.status == expected)?;
                consultation.apply(&update);
                Some(consultation.clone())
            })
            .await
    }
}

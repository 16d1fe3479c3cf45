use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::{AppConfig, StorageBackend};
use shared_database::{LocalStore, SupabaseClient};
use shared_models::auth::UserRole;

use crate::models::{NewProfile, UserProfile};

const PROFILES_KEY: &str = "usuarios";

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: NewProfile, auth_token: Option<&str>) -> Result<UserProfile>;

    async fn find_by_id(&self, id: &str, auth_token: Option<&str>) -> Result<Option<UserProfile>>;

    async fn find_by_email(&self, email: &str, auth_token: Option<&str>) -> Result<Option<UserProfile>>;

    /// Profiles with `role`, ordered by name.
    async fn list_by_role(&self, role: UserRole, auth_token: Option<&str>) -> Result<Vec<UserProfile>>;
}

pub fn build_profile_repository(
    config: &AppConfig,
    store: Arc<LocalStore>,
) -> Arc<dyn ProfileRepository> {
    match config.storage_backend {
        StorageBackend::Supabase => Arc::new(SupabaseProfileRepository::new(config)),
        StorageBackend::Local | StorageBackend::Memory => Arc::new(LocalProfileRepository::new(store)),
    }
}

/// `usuarios` for every account plus `medicos` for doctors.
pub struct SupabaseProfileRepository {
    supabase: SupabaseClient,
}

impl SupabaseProfileRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn select_one(&self, filter: &str, auth_token: Option<&str>) -> Result<Option<UserProfile>> {
        let path = format!("/rest/v1/usuarios?{}&select=*", filter);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            auth_token,
            None,
        ).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProfileRepository for SupabaseProfileRepository {
    async fn create(&self, profile: NewProfile, auth_token: Option<&str>) -> Result<UserProfile> {
        debug!("Inserting profile {} ({})", profile.id, profile.role);

        let row = json!({
            "id": profile.id,
            "email": profile.email,
            "nome": profile.name,
            "tipo": profile.role,
            "regiao": profile.region,
            "idade": profile.age,
            "crm": profile.crm,
            "especialidade": profile.specialty,
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/usuarios",
            auth_token,
            Some(row),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to create user profile"))?;
        let created: UserProfile = serde_json::from_value(created)?;

        if created.role == UserRole::Doctor {
            let doctor_row = json!({
                "id": created.id,
                "nome": created.name,
                "email": created.email,
                "crm": created.crm,
                "especialidade": created.specialty.clone().unwrap_or_default(),
                "disponivel": true,
            });

            let _: Vec<Value> = self.supabase.request_with_headers(
                Method::POST,
                "/rest/v1/medicos",
                auth_token,
                Some(doctor_row),
                Some(SupabaseClient::representation_headers()),
            ).await?;
        }

        Ok(created)
    }

    async fn find_by_id(&self, id: &str, auth_token: Option<&str>) -> Result<Option<UserProfile>> {
        self.select_one(&format!("id=eq.{}", urlencoding::encode(id)), auth_token).await
    }

    async fn find_by_email(&self, email: &str, auth_token: Option<&str>) -> Result<Option<UserProfile>> {
        self.select_one(&format!("email=eq.{}", urlencoding::encode(email)), auth_token).await
    }

    async fn list_by_role(&self, role: UserRole, auth_token: Option<&str>) -> Result<Vec<UserProfile>> {
        let path = format!("/rest/v1/usuarios?tipo=eq.{}&select=*&order=nome.asc", role);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            auth_token,
            None,
        ).await?;

        let profiles = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<UserProfile>, _>>()?;
        Ok(profiles)
    }
}

pub struct LocalProfileRepository {
    store: Arc<LocalStore>,
}

impl LocalProfileRepository {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    async fn all(&self) -> Result<Vec<UserProfile>> {
        self.store.get_or_default(PROFILES_KEY).await
    }
}

#[async_trait]
impl ProfileRepository for LocalProfileRepository {
    async fn create(&self, profile: NewProfile, _auth_token: Option<&str>) -> Result<UserProfile> {
        let profile = profile.into_profile();

        let inserted = self
            .store
            .update::<Vec<UserProfile>, _, _>(PROFILES_KEY, |profiles| {
                if profiles.iter().any(|p| p.id == profile.id || p.email == profile.email) {
                    return false;
                }
                profiles.push(profile.clone());
                true
            })
            .await?;

        if !inserted {
            return Err(anyhow!("Profile {} already exists", profile.email));
        }

        Ok(profile)
    }

    async fn find_by_id(&self, id: &str, _auth_token: Option<&str>) -> Result<Option<UserProfile>> {
        Ok(self.all().await?.into_iter().find(|p| p.id == id))
    }

    async fn find_by_email(&self, email: &str, _auth_token: Option<&str>) -> Result<Option<UserProfile>> {
        Ok(self.all().await?.into_iter().find(|p| p.email.eq_ignore_ascii_case(email)))
    }

    async fn list_by_role(&self, role: UserRole, _auth_token: Option<&str>) -> Result<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self
            .all()
            .await?
            .into_iter()
            .filter(|p| p.role == role)
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }
}

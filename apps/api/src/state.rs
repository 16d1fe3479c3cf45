use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use admin_cell::AdminService;
use auth_cell::AuthService;
use chat_cell::ChatService;
use consultation_cell::{build_consultation_repository, ConsultationService};
use eligibility_cell::RegionRegistry;
use notification_cell::NotificationService;
use profile_cell::{build_profile_repository, ProfileService};
use shared_config::{AppConfig, StorageBackend};
use shared_database::LocalStore;

/// Services shared by every request, wired once at startup.
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub regions: Arc<RegionRegistry>,
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService>,
    pub consultations: Arc<ConsultationService>,
    pub notifications: Arc<NotificationService>,
    pub chat: Arc<ChatService>,
    pub admin: Arc<AdminService>,
}

impl AppServices {
    pub async fn build(config: Arc<AppConfig>) -> Result<Self> {
        let store = match config.storage_backend {
            StorageBackend::Local => {
                let store = LocalStore::open(&config.local_storage_path)
                    .await
                    .with_context(|| format!("Failed to open {}", config.local_storage_path))?;
                info!("Local storage at {}", config.local_storage_path);
                store
            }
            StorageBackend::Supabase | StorageBackend::Memory => LocalStore::in_memory(),
        };
        let store = Arc::new(store);
        info!(
            "Storage backend: {} (local documents persisted: {})",
            config.storage_backend,
            store.is_persistent()
        );

        let regions = Arc::new(RegionRegistry::new(store.clone()));
        regions.seed_defaults().await?;

        let profiles = Arc::new(ProfileService::new(build_profile_repository(&config, store.clone())));
        let notifications = Arc::new(NotificationService::new(store.clone()));
        let consultations = Arc::new(ConsultationService::new(
            build_consultation_repository(&config, store.clone()),
            profiles.clone(),
            notifications.clone(),
        ));
        let chat = Arc::new(ChatService::new(store, consultations.clone()));
        let auth = Arc::new(AuthService::new(config.clone(), profiles.clone(), regions.clone()));
        let admin = Arc::new(AdminService::new(regions.clone(), profiles.clone(), consultations.clone()));

        Ok(Self {
            config,
            regions,
            auth,
            profiles,
            consultations,
            notifications,
            chat,
            admin,
        })
    }
}

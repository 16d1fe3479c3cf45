use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid STORAGE_BACKEND: {0}")]
    InvalidStorageBackend(String),

    #[error("STORAGE_BACKEND=supabase requires SUPABASE_URL and SUPABASE_ANON_PUBLIC_KEY")]
    SupabaseNotConfigured,
}

/// Where consultation requests and profiles are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Supabase,
    Local,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::Supabase => "supabase",
            StorageBackend::Local => "local",
            StorageBackend::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "supabase" => Ok(StorageBackend::Supabase),
            "local" | "file" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub server_port: u16,
}

impl AppConfig {
    /// Missing Supabase values only warn; a storage backend that cannot be used is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_anon_key = env::var("SUPABASE_ANON_PUBLIC_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                String::new()
            });
        let supabase_jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_JWT_SECRET not set, using empty value");
                String::new()
            });
        let supabase_available = !supabase_url.is_empty() && !supabase_anon_key.is_empty();

        let storage_backend =
            Self::storage_backend_from(env::var("STORAGE_BACKEND").ok().as_deref(), supabase_available)?;

        let local_storage_path = env::var("LOCAL_STORAGE_PATH")
            .unwrap_or_else(|_| "data/medicos-para-todos.json".to_string());

        let server_port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let config = Self {
            supabase_url,
            supabase_anon_key,
            supabase_jwt_secret,
            storage_backend,
            local_storage_path,
            server_port,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config.validate()?;
        Ok(config)
    }

    /// Unset defaults to Supabase when it is reachable, memory otherwise.
    pub fn storage_backend_from(
        value: Option<&str>,
        supabase_available: bool,
    ) -> Result<StorageBackend, ConfigError> {
        match value {
            Some(value) => value.parse().map_err(ConfigError::InvalidStorageBackend),
            None if supabase_available => Ok(StorageBackend::Supabase),
            None => {
                warn!("STORAGE_BACKEND not set and Supabase not configured, using memory storage");
                Ok(StorageBackend::Memory)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_backend == StorageBackend::Supabase && !self.is_supabase_available() {
            return Err(ConfigError::SupabaseNotConfigured);
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// Auth delegation only needs the project URL and anon key.
    pub fn is_supabase_available(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

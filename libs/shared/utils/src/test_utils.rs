use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_backend: StorageBackend,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            storage_backend: StorageBackend::Memory,
        }
    }
}

impl TestConfig {
    pub fn supabase(supabase_url: &str) -> Self {
        Self {
            supabase_url: supabase_url.to_string(),
            storage_backend: StorageBackend::Supabase,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            storage_backend: self.storage_backend,
            local_storage_path: String::new(),
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "paciente")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        let name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name,
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "medico")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "paciente")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: Some(json!({ "nome": self.name })),
            created_at: Some(Utc::now()),
        }
    }

    pub fn token(&self, config: &TestConfig) -> String {
        JwtTestUtils::create_test_token(self, &config.jwt_secret, None)
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// HS256-signs arbitrary claims, the way GoTrue issues access tokens.
    pub fn sign(claims: &serde_json::Value, secret: &str) -> String {
        let encode = |part: &serde_json::Value| general_purpose::URL_SAFE_NO_PAD.encode(part.to_string());
        let signing_input = format!(
            "{}.{}",
            encode(&json!({ "alg": "HS256", "typ": "JWT" })),
            encode(claims)
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(signing_input.as_bytes());

        format!(
            "{}.{}",
            signing_input,
            general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        )
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::hours(exp_hours.unwrap_or(24));

        Self::sign(
            &json!({
                "sub": user.id,
                "email": user.email,
                "role": user.role,
                "user_metadata": { "nome": user.name },
                "iat": issued_at.timestamp(),
                "exp": expires_at.timestamp()
            }),
            secret,
        )
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn usuario_response(user: &TestUser, regiao: Option<&str>) -> serde_json::Value {
        json!({
            "id": user.id,
            "email": user.email,
            "nome": user.name,
            "tipo": user.role,
            "regiao": regiao,
            "idade": null,
            "crm": null,
            "especialidade": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn solicitacao_response(id: &str, patient: &TestUser, descricao: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "paciente_id": patient.id,
            "paciente_nome": patient.name,
            "paciente_email": patient.email,
            "paciente_regiao": "Zona Rural - Bahia",
            "paciente_idade": null,
            "descricao": descricao,
            "prioridade": "baixa",
            "status": status,
            "medico_id": null,
            "medico_nome": null,
            "created_at": "2024-01-01T12:00:00Z",
            "aceita_em": null,
            "iniciada_em": null,
            "finalizada_em": null,
            "finalizada_por": null,
            "arquivos_solicitacao": []
        })
    }

    pub fn session_response(user: &TestUser, access_token: &str) -> serde_json::Value {
        json!({
            "access_token": access_token,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": {
                "id": user.id,
                "email": user.email,
                "user_metadata": { "nome": user.name, "tipo": user.role }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert_eq!(app_config.storage_backend, StorageBackend::Memory);
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@example.com").with_name("Dra. Ana");
        assert_eq!(user.email, "doc@example.com");
        assert_eq!(user.role, "medico");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.display_name(), "Dra. Ana");
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }
}

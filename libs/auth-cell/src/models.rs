use serde::{Deserialize, Serialize};

use profile_cell::UserProfile;
use shared_models::auth::{User, UserRole};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "tipo", default = "default_role")]
    pub role: UserRole,
    #[serde(alias = "regiao", default)]
    pub region: Option<String>,
    #[serde(alias = "idade", default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub crm: Option<String>,
    #[serde(alias = "especialidade", default)]
    pub specialty: Option<String>,
}

fn default_role() -> UserRole {
    UserRole::Patient
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    /// True when the provider requires email confirmation before login.
    pub confirmation_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_region: Option<String>,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user_id: String,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub user: User,
    pub profile: Option<UserProfile>,
}

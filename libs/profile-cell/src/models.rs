use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::auth::UserRole;

/// Row of the `usuarios` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub role: UserRole,
    #[serde(rename = "regiao", default)]
    pub region: Option<String>,
    #[serde(rename = "idade", default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub crm: Option<String>,
    #[serde(rename = "especialidade", default)]
    pub specialty: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub region: Option<String>,
    pub age: Option<u32>,
    pub crm: Option<String>,
    pub specialty: Option<String>,
}

impl NewProfile {
    pub fn into_profile(self) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: self.id,
            email: self.email,
            name: self.name,
            role: self.role,
            region: self.region,
            age: self.age,
            crm: self.crm,
            specialty: self.specialty,
            created_at: now,
            updated_at: now,
        }
    }
}

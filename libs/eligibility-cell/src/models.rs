use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Region whose residents qualify for free consultations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleRegion {
    pub id: String,
    pub name: String,
    pub state: String,
    pub criteria: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_region: Option<EligibleRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EligibilityResult {
    pub fn eligible(region: EligibleRegion) -> Self {
        Self {
            eligible: true,
            matched_region: Some(region),
            reason: None,
        }
    }

    pub fn rejected(reason: &str) -> Self {
        Self {
            eligible: false,
            matched_region: None,
            reason: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityQuery {
    #[serde(alias = "region")]
    pub regiao: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegionRequest {
    pub name: String,
    pub state: String,
    pub criteria: String,
}

pub const BRAZILIAN_STATES: [&str; 27] = [
    "Acre",
    "Alagoas",
    "Amapá",
    "Amazonas",
    "Bahia",
    "Ceará",
    "Distrito Federal",
    "Espírito Santo",
    "Goiás",
    "Maranhão",
    "Mato Grosso",
    "Mato Grosso do Sul",
    "Minas Gerais",
    "Pará",
    "Paraíba",
    "Paraná",
    "Pernambuco",
    "Piauí",
    "Rio de Janeiro",
    "Rio Grande do Norte",
    "Rio Grande do Sul",
    "Rondônia",
    "Roraima",
    "Santa Catarina",
    "São Paulo",
    "Sergipe",
    "Tocantins",
];

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::LocalStore;

use crate::error::EligibilityError;
use crate::models::{CreateRegionRequest, EligibilityResult, EligibleRegion, BRAZILIAN_STATES};
use crate::services::matcher::check_eligibility;

const REGIONS_KEY: &str = "regioes_elegiveis";

/// Eligible regions kept in the local store, seeded on first use.
pub struct RegionRegistry {
    store: Arc<LocalStore>,
}

impl RegionRegistry {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Writes the default region list unless one is already stored.
    pub async fn seed_defaults(&self) -> Result<(), EligibilityError> {
        if self.store.contains(REGIONS_KEY).await {
            return Ok(());
        }

        let regions = default_regions();
        info!("Seeding {} default eligible regions", regions.len());
        self.store.set(REGIONS_KEY, &regions).await?;
        Ok(())
    }

    pub async fn all(&self) -> Result<Vec<EligibleRegion>, EligibilityError> {
        Ok(self.store.get_or_default(REGIONS_KEY).await?)
    }

    pub async fn active(&self) -> Result<Vec<EligibleRegion>, EligibilityError> {
        Ok(self.all().await?.into_iter().filter(|r| r.active).collect())
    }

    pub async fn check(&self, region: &str) -> Result<EligibilityResult, EligibilityError> {
        let regions = self.all().await?;
        Ok(check_eligibility(&regions, region))
    }

    /// Sorted names of the active regions.
    pub async fn suggestions(&self) -> Result<Vec<String>, EligibilityError> {
        let mut names: Vec<String> = self
            .active()
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        names.sort();
        Ok(names)
    }

    pub async fn add(
        &self,
        request: CreateRegionRequest,
        created_by: &str,
    ) -> Result<EligibleRegion, EligibilityError> {
        let name = request.name.trim();
        let state = request.state.trim();
        let criteria = request.criteria.trim();

        if name.is_empty() || state.is_empty() || criteria.is_empty() {
            return Err(EligibilityError::Validation(
                "name, state and criteria are required".to_string(),
            ));
        }

        let canonical_state = BRAZILIAN_STATES
            .iter()
            .find(|s| s.to_lowercase() == state.to_lowercase())
            .ok_or_else(|| EligibilityError::Validation(format!("Unknown state: {}", state)))?;

        let region = EligibleRegion {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            state: canonical_state.to_string(),
            criteria: criteria.to_string(),
            active: true,
            created_at: Utc::now(),
            created_by: created_by.to_string(),
        };

        let duplicate = self
            .store
            .update::<Vec<EligibleRegion>, _, _>(REGIONS_KEY, |regions| {
                if regions.iter().any(|r| r.name.to_lowercase() == region.name.to_lowercase()) {
                    return true;
                }
                regions.insert(0, region.clone());
                false
            })
            .await?;

        if duplicate {
            return Err(EligibilityError::Validation(format!(
                "Region '{}' already exists", region.name
            )));
        }

        info!("Eligible region {} ({}) added by {}", region.name, region.id, created_by);
        Ok(region)
    }

    pub async fn remove(&self, id: &str) -> Result<EligibleRegion, EligibilityError> {
        let removed = self
            .store
            .update::<Vec<EligibleRegion>, _, _>(REGIONS_KEY, |regions| {
                let index = regions.iter().position(|r| r.id == id)?;
                Some(regions.remove(index))
            })
            .await?;

        let removed = removed.ok_or_else(|| EligibilityError::NotFound(id.to_string()))?;
        info!("Eligible region {} removed", removed.id);
        Ok(removed)
    }

    pub async fn toggle(&self, id: &str) -> Result<EligibleRegion, EligibilityError> {
        let toggled = self
            .store
            .update::<Vec<EligibleRegion>, _, _>(REGIONS_KEY, |regions| {
                let region = regions.iter_mut().find(|r| r.id == id)?;
                region.active = !region.active;
                Some(region.clone())
            })
            .await?;

        let toggled = toggled.ok_or_else(|| EligibilityError::NotFound(id.to_string()))?;
        debug!("Region {} active = {}", toggled.id, toggled.active);
        Ok(toggled)
    }
}

pub fn default_regions() -> Vec<EligibleRegion> {
    let now = Utc::now();
    let seed: [(&str, &str, &str, &str); 12] = [
        (
            "Interior de São Paulo",
            "São Paulo",
            "Municípios com menos de 50.000 habitantes e distância superior a 100km da capital",
            "Prefeitura de São Paulo",
        ),
        (
            "Zona Rural - Bahia",
            "Bahia",
            "Comunidades rurais sem acesso a unidades básicas de saúde em raio de 50km",
            "Governo do Estado da Bahia",
        ),
        (
            "Amazônia - Acre",
            "Acre",
            "Comunidades ribeirinhas e indígenas com acesso limitado a transporte",
            "Secretaria de Saúde do Acre",
        ),
        (
            "Sertão Nordestino",
            "Ceará",
            "Municípios do semiárido com população inferior a 30.000 habitantes",
            "Governo do Estado do Ceará",
        ),
        (
            "Pantanal - Mato Grosso",
            "Mato Grosso",
            "Comunidades pantaneiras com acesso limitado por via terrestre",
            "Secretaria de Saúde de MT",
        ),
        (
            "Interior do Rio Grande do Sul",
            "Rio Grande do Sul",
            "Municípios do interior com menos de 30.000 habitantes e distância superior a 80km de Porto Alegre",
            "Governo do Estado do RS",
        ),
        (
            "Zona Rural - Rio Grande do Sul",
            "Rio Grande do Sul",
            "Comunidades rurais e assentamentos com acesso limitado a serviços de saúde",
            "Secretaria de Saúde do RS",
        ),
        (
            "Serra Gaúcha - Interior",
            "Rio Grande do Sul",
            "Municípios da serra com população inferior a 20.000 habitantes",
            "Consórcio Intermunicipal da Serra",
        ),
        (
            "Fronteira Oeste - RS",
            "Rio Grande do Sul",
            "Municípios da fronteira com Uruguai e Argentina com acesso limitado a especialistas",
            "Prefeituras da Fronteira Oeste",
        ),
        (
            "Campanha Gaúcha",
            "Rio Grande do Sul",
            "Estâncias e comunidades rurais da região da Campanha",
            "Associação dos Municípios da Campanha",
        ),
        (
            "Norte do Rio Grande do Sul",
            "Rio Grande do Sul",
            "Municípios do norte gaúcho com população inferior a 25.000 habitantes",
            "Consórcio Intermunicipal do Norte",
        ),
        (
            "Vale do Taquari - Interior",
            "Rio Grande do Sul",
            "Pequenos municípios do Vale do Taquari com acesso limitado a especialidades médicas",
            "CODEVAT",
        ),
    ];

    seed.iter()
        .enumerate()
        .map(|(i, (name, state, criteria, created_by))| EligibleRegion {
            id: (i + 1).to_string(),
            name: name.to_string(),
            state: state.to_string(),
            criteria: criteria.to_string(),
            active: true,
            created_at: now,
            created_by: created_by.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn registry() -> RegionRegistry {
        let registry = RegionRegistry::new(Arc::new(LocalStore::in_memory()));
        registry.seed_defaults().await.unwrap();
        registry
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let registry = registry().await;
        registry.remove("1").await.unwrap();
        registry.seed_defaults().await.unwrap();

        assert_eq!(registry.all().await.unwrap().len(), 11);
    }

    #[tokio::test]
    async fn suggestions_are_sorted_active_names() {
        let registry = registry().await;
        registry.toggle("3").await.unwrap();

        let suggestions = registry.suggestions().await.unwrap();
        assert_eq!(suggestions.len(), 11);
        assert_eq!(suggestions.first().map(String::as_str), Some("Campanha Gaúcha"));
        assert!(!suggestions.contains(&"Amazônia - Acre".to_string()));
        assert!(suggestions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn added_region_is_matched_and_state_is_canonicalized() {
        let registry = registry().await;
        let region = registry
            .add(
                CreateRegionRequest {
                    name: "Vale do Jequitinhonha".to_string(),
                    state: "minas gerais".to_string(),
                    criteria: "Municípios com baixo IDH".to_string(),
                },
                "admin@example.com",
            )
            .await
            .unwrap();

        assert_eq!(region.state, "Minas Gerais");
        assert_eq!(registry.all().await.unwrap()[0].id, region.id);

        let result = registry.check("vale do jequitinhonha").await.unwrap();
        assert!(result.eligible);
    }

    #[tokio::test]
    async fn add_rejects_invalid_input() {
        let registry = registry().await;

        let missing = registry
            .add(
                CreateRegionRequest {
                    name: " ".to_string(),
                    state: "Bahia".to_string(),
                    criteria: "x".to_string(),
                },
                "admin",
            )
            .await;
        assert_matches!(missing, Err(EligibilityError::Validation(_)));

        let unknown_state = registry
            .add(
                CreateRegionRequest {
                    name: "Nova".to_string(),
                    state: "Atlântida".to_string(),
                    criteria: "x".to_string(),
                },
                "admin",
            )
            .await;
        assert_matches!(unknown_state, Err(EligibilityError::Validation(_)));

        let duplicate = registry
            .add(
                CreateRegionRequest {
                    name: "campanha gaúcha".to_string(),
                    state: "Rio Grande do Sul".to_string(),
                    criteria: "x".to_string(),
                },
                "admin",
            )
            .await;
        assert_matches!(duplicate, Err(EligibilityError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let registry = registry().await;
        assert_matches!(registry.remove("missing").await, Err(EligibilityError::NotFound(_)));
        assert_matches!(registry.toggle("missing").await, Err(EligibilityError::NotFound(_)));
    }
}

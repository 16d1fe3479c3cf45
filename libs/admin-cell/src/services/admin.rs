use std::sync::Arc;

use tracing::{debug, info};

use consultation_cell::{ConsultationService, ConsultationStatus};
use eligibility_cell::{check_eligibility, CreateRegionRequest, EligibleRegion, RegionRegistry};
use profile_cell::ProfileService;
use shared_models::auth::{User, UserRole};

use crate::error::AdminError;
use crate::models::AdminStats;

pub struct AdminService {
    regions: Arc<RegionRegistry>,
    profiles: Arc<ProfileService>,
    consultations: Arc<ConsultationService>,
}

impl AdminService {
    pub fn new(
        regions: Arc<RegionRegistry>,
        profiles: Arc<ProfileService>,
        consultations: Arc<ConsultationService>,
    ) -> Self {
        Self { regions, profiles, consultations }
    }

    /// Every region, inactive ones included.
    pub async fn regions(&self) -> Result<Vec<EligibleRegion>, AdminError> {
        Ok(self.regions.all().await?)
    }

    pub async fn add_region(
        &self,
        admin: &User,
        request: CreateRegionRequest,
    ) -> Result<EligibleRegion, AdminError> {
        let created_by = admin.email.clone().unwrap_or_else(|| admin.id.clone());
        Ok(self.regions.add(request, &created_by).await?)
    }

    pub async fn remove_region(&self, admin: &User, id: &str) -> Result<EligibleRegion, AdminError> {
        let removed = self.regions.remove(id).await?;
        info!("Admin {} removed region {}", admin.id, removed.name);
        Ok(removed)
    }

    pub async fn toggle_region(&self, admin: &User, id: &str) -> Result<EligibleRegion, AdminError> {
        let toggled = self.regions.toggle(id).await?;
        info!(
            "Admin {} set region {} active = {}",
            admin.id, toggled.name, toggled.active
        );
        Ok(toggled)
    }

    pub async fn stats(&self, auth_token: &str) -> Result<AdminStats, AdminError> {
        let regions = self.regions.all().await?;
        let active: Vec<EligibleRegion> = regions.iter().filter(|r| r.active).cloned().collect();

        let patients = self.profiles.list_by_role(UserRole::Patient, Some(auth_token)).await?;
        let eligible_patients = patients
            .iter()
            .filter_map(|p| p.region.as_deref())
            .filter(|region| check_eligibility(&active, region).eligible)
            .count();

        let doctors = self.profiles.list_by_role(UserRole::Doctor, Some(auth_token)).await?;
        let consultations = self.consultations.all(Some(auth_token)).await?;

        let stats = AdminStats {
            registered_regions: regions.len(),
            active_regions: active.len(),
            eligible_patients,
            pending_requests: consultations
                .iter()
                .filter(|c| c.status == ConsultationStatus::New)
                .count(),
            total_requests: consultations.len(),
            active_doctors: doctors.len(),
        };

        debug!("Admin stats: {:?}", stats);
        Ok(stats)
    }
}

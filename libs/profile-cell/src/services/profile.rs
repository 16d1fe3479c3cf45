use std::sync::Arc;

use tracing::{debug, info};

use shared_models::auth::{User, UserRole};

use crate::error::ProfileError;
use crate::models::{NewProfile, UserProfile};
use crate::services::repository::ProfileRepository;

pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    pub async fn register(
        &self,
        profile: NewProfile,
        auth_token: Option<&str>,
    ) -> Result<UserProfile, ProfileError> {
        if profile.name.trim().is_empty() {
            return Err(ProfileError::Validation("Name is required".to_string()));
        }

        if self.repository.find_by_email(&profile.email, auth_token).await?.is_some() {
            return Err(ProfileError::EmailAlreadyExists { email: profile.email });
        }

        let created = self.repository.create(profile, auth_token).await?;
        info!("Profile created for {} as {}", created.id, created.role);
        Ok(created)
    }

    pub async fn find(
        &self,
        id: &str,
        auth_token: Option<&str>,
    ) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.repository.find_by_id(id, auth_token).await?)
    }

    pub async fn get(&self, id: &str, auth_token: Option<&str>) -> Result<UserProfile, ProfileError> {
        self.find(id, auth_token)
            .await?
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }

    /// Users may read their own profile; doctors and admins may read any.
    pub async fn get_for_viewer(
        &self,
        viewer: &User,
        id: &str,
        auth_token: &str,
    ) -> Result<UserProfile, ProfileError> {
        debug!("User {} requesting profile {}", viewer.id, id);

        let privileged = matches!(viewer.app_role(), Some(UserRole::Doctor | UserRole::Admin));
        if viewer.id != id && !privileged {
            return Err(ProfileError::Forbidden);
        }

        self.get(id, Some(auth_token)).await
    }

    pub async fn list_by_role(
        &self,
        role: UserRole,
        auth_token: Option<&str>,
    ) -> Result<Vec<UserProfile>, ProfileError> {
        Ok(self.repository.list_by_role(role, auth_token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_database::LocalStore;
    use shared_utils::test_utils::TestUser;

    use crate::services::repository::LocalProfileRepository;

    fn service() -> ProfileService {
        ProfileService::new(Arc::new(LocalProfileRepository::new(Arc::new(LocalStore::in_memory()))))
    }

    fn new_profile(id: &str, email: &str, name: &str, role: UserRole) -> NewProfile {
        NewProfile {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            region: None,
            age: None,
            crm: None,
            specialty: None,
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let service = service();
        service.register(new_profile("1", "ana@example.com", "Ana", UserRole::Patient), None).await.unwrap();

        let duplicate = service
            .register(new_profile("2", "ana@example.com", "Ana 2", UserRole::Patient), None)
            .await;
        assert_matches!(duplicate, Err(ProfileError::EmailAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn register_requires_name() {
        let result = service()
            .register(new_profile("1", "x@example.com", "  ", UserRole::Doctor), None)
            .await;
        assert_matches!(result, Err(ProfileError::Validation(_)));
    }

    #[tokio::test]
    async fn list_by_role_is_sorted_by_name() {
        let service = service();
        service.register(new_profile("1", "z@example.com", "Zélia", UserRole::Doctor), None).await.unwrap();
        service.register(new_profile("2", "a@example.com", "Abel", UserRole::Doctor), None).await.unwrap();
        service.register(new_profile("3", "p@example.com", "Paula", UserRole::Patient), None).await.unwrap();

        let doctors = service.list_by_role(UserRole::Doctor, None).await.unwrap();
        let names: Vec<&str> = doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Abel", "Zélia"]);
    }

    #[tokio::test]
    async fn patients_only_read_their_own_profile() {
        let service = service();
        let patient = TestUser::patient("p@example.com");
        let other = TestUser::patient("o@example.com");
        service
            .register(new_profile(&other.id, &other.email, "Outro", UserRole::Patient), None)
            .await
            .unwrap();

        let denied = service.get_for_viewer(&patient.to_user(), &other.id, "token").await;
        assert_matches!(denied, Err(ProfileError::Forbidden));

        let doctor = TestUser::doctor("d@example.com");
        let seen = service.get_for_viewer(&doctor.to_user(), &other.id, "token").await.unwrap();
        assert_eq!(seen.name, "Outro");

        let missing = service.get_for_viewer(&doctor.to_user(), "nope", "token").await;
        assert_matches!(missing, Err(ProfileError::NotFound(_)));
    }
}

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use eligibility_cell::RegionRegistry;
use profile_cell::{NewProfile, ProfileService};
use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};
use shared_models::auth::{User, UserRole};
use shared_utils::jwt::validate_token;

use crate::error::AuthError;
use crate::models::{
    CurrentUserResponse, LoginRequest, LoginResponse, SignupRequest, SignupResponse,
};

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok()
});

/// Signup, login and token checks. Credentials are handled by Supabase Auth;
/// this service adds eligibility rules and the profile row.
pub struct AuthService {
    config: Arc<AppConfig>,
    supabase: SupabaseClient,
    profiles: Arc<ProfileService>,
    regions: Arc<RegionRegistry>,
}

impl AuthService {
    pub fn new(
        config: Arc<AppConfig>,
        profiles: Arc<ProfileService>,
        regions: Arc<RegionRegistry>,
    ) -> Self {
        Self {
            supabase: SupabaseClient::new(&config),
            config,
            profiles,
            regions,
        }
    }

    pub fn validate_email(&self, email: &str) -> bool {
        email.len() <= MAX_EMAIL_LENGTH
            && EMAIL_PATTERN.as_ref().is_some_and(|pattern| pattern.is_match(email))
    }

    fn ensure_provider(&self) -> Result<(), AuthError> {
        if self.config.is_supabase_available() {
            Ok(())
        } else {
            Err(AuthError::ProviderUnavailable)
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<SignupResponse, AuthError> {
        self.ensure_provider()?;

        let email = request.email.trim().to_lowercase();
        let name = request.name.trim().to_string();

        if !self.validate_email(&email) {
            return Err(AuthError::Validation(format!("Invalid email: {}", request.email)));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must have at least {} characters", MIN_PASSWORD_LENGTH
            )));
        }
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        let mut eligible_region = None;
        match request.role {
            UserRole::Patient => {
                let region = request.region.as_deref().unwrap_or_default();
                let result = self.regions.check(region).await?;
                if !result.eligible {
                    let reason = result.reason.unwrap_or_default();
                    info!("Signup for {} rejected: region '{}' not eligible", email, region);
                    return Err(AuthError::NotEligible(reason));
                }
                eligible_region = result.matched_region.map(|r| r.name);
            }
            UserRole::Doctor => {
                let has_crm = request.crm.as_deref().is_some_and(|c| !c.trim().is_empty());
                let has_specialty = request.specialty.as_deref().is_some_and(|s| !s.trim().is_empty());
                if !has_crm || !has_specialty {
                    return Err(AuthError::Validation(
                        "Doctors must provide CRM and specialty".to_string(),
                    ));
                }
            }
            UserRole::Admin => {
                return Err(AuthError::Validation(
                    "Admin accounts cannot be created through signup".to_string(),
                ));
            }
        }

        let metadata = json!({ "nome": name, "tipo": request.role });
        let response = self.supabase
            .sign_up(&email, &request.password, metadata)
            .await
            .map_err(map_signup_error)?;

        let user_id = response
            .get("user")
            .and_then(|u| u.get("id"))
            .or_else(|| response.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Provider(anyhow::anyhow!("Signup response without user id")))?
            .to_string();
        let access_token = response
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string);

        debug!("Auth user {} created for {}", user_id, email);

        let profile = self.profiles
            .register(
                NewProfile {
                    id: user_id.clone(),
                    email: email.clone(),
                    name,
                    role: request.role,
                    region: request.region.map(|r| r.trim().to_string()),
                    age: request.age,
                    crm: request.crm.map(|c| c.trim().to_string()),
                    specialty: request.specialty.map(|s| s.trim().to_string()),
                },
                access_token.as_deref(),
            )
            .await?;

        info!("User {} signed up as {}", user_id, request.role);

        Ok(SignupResponse {
            user_id,
            email,
            role: request.role,
            confirmation_required: access_token.is_none(),
            eligible_region,
            profile,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        self.ensure_provider()?;

        let email = request.email.trim().to_lowercase();
        let session = self.supabase
            .sign_in_with_password(&email, &request.password)
            .await
            .map_err(|e| match e.downcast_ref::<SupabaseError>() {
                Some(SupabaseError::Auth(_)) => AuthError::InvalidCredentials,
                _ => AuthError::Provider(e),
            })?;

        let access_token = session
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Provider(anyhow::anyhow!("Login response without access token")))?
            .to_string();
        let user_id = session
            .get("user")
            .and_then(|u| u.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Provider(anyhow::anyhow!("Login response without user")))?
            .to_string();

        let profile = match self.profiles.find(&user_id, Some(&access_token)).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Could not load profile for {}: {}", user_id, e);
                None
            }
        };

        info!("User {} logged in", user_id);

        Ok(LoginResponse {
            access_token,
            refresh_token: session.get("refresh_token").and_then(Value::as_str).map(str::to_string),
            expires_in: session.get("expires_in").and_then(Value::as_u64),
            user_id,
            profile,
        })
    }

    pub async fn logout(&self, auth_token: &str) -> Result<(), AuthError> {
        self.ensure_provider()?;
        self.supabase.sign_out(auth_token).await.map_err(AuthError::Provider)
    }

    pub fn validate(&self, token: &str) -> Result<User, AuthError> {
        validate_token(token, &self.config.supabase_jwt_secret).map_err(AuthError::Token)
    }

    pub async fn current_user(&self, user: User, auth_token: &str) -> Result<CurrentUserResponse, AuthError> {
        let profile = self.profiles.find(&user.id, Some(auth_token)).await?;
        Ok(CurrentUserResponse { user, profile })
    }
}

fn map_signup_error(err: anyhow::Error) -> AuthError {
    match err.downcast_ref::<SupabaseError>() {
        Some(SupabaseError::Auth(msg)) | Some(SupabaseError::Conflict(msg)) => {
            AuthError::Rejected(msg.clone())
        }
        Some(SupabaseError::Api { status: 422, message }) => AuthError::Rejected(message.clone()),
        _ => AuthError::Provider(err),
    }
}

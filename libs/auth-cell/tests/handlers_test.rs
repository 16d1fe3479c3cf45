use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::{auth_routes, AuthService};
use eligibility_cell::RegionRegistry;
use profile_cell::{LocalProfileRepository, NewProfile, ProfileService};
use shared_database::LocalStore;
use shared_models::auth::UserRole;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

struct TestApp {
    router: Router,
    profiles: Arc<ProfileService>,
}

async fn test_app(config: &TestConfig) -> TestApp {
    let store = Arc::new(LocalStore::in_memory());
    let regions = Arc::new(RegionRegistry::new(store.clone()));
    regions.seed_defaults().await.unwrap();
    let profiles = Arc::new(ProfileService::new(Arc::new(LocalProfileRepository::new(store))));

    let app_config = config.to_arc();
    let service = Arc::new(AuthService::new(app_config.clone(), profiles.clone(), regions));

    TestApp {
        router: auth_routes(app_config, service),
        profiles,
    }
}

fn config_for(server: &MockServer) -> TestConfig {
    TestConfig {
        supabase_url: server.uri(),
        ..TestConfig::default()
    }
}

async fn send(router: Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn patient_signup_from_eligible_region_creates_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "joao@example.com",
            "data": { "tipo": "paciente", "nome": "João Silva" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "auth-user-1",
            "email": "joao@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let app = test_app(&config).await;

    let (status, json) = send(
        app.router,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": " Joao@Example.com ",
            "password": "segredo123",
            "nome": "João Silva",
            "tipo": "paciente",
            "regiao": "Zona rural da Bahia, perto de Irecê"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_id"], "auth-user-1");
    assert_eq!(json["confirmation_required"], true);
    assert_eq!(json["eligible_region"], "Zona Rural - Bahia");

    let profile = app.profiles.get("auth-user-1", None).await.unwrap();
    assert_eq!(profile.email, "joao@example.com");
    assert_eq!(profile.role, UserRole::Patient);
}

#[tokio::test]
async fn patient_signup_from_ineligible_region_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "never" })))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let app = test_app(&config).await;

    let (status, json) = send(
        app.router,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": "ana@example.com",
            "password": "segredo123",
            "nome": "Ana",
            "regiao": "Centro de Porto Alegre"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Região não está na lista de áreas elegíveis para atendimento gratuito"
    );
}

#[tokio::test]
async fn doctor_signup_requires_crm_and_specialty() {
    let config = TestConfig::default();
    let app = test_app(&config).await;

    let (status, json) = send(
        app.router,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": "dra@example.com",
            "password": "segredo123",
            "nome": "Dra. Maria",
            "tipo": "medico",
            "especialidade": "Clínica Geral"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Doctors must provide CRM and specialty");
}

#[tokio::test]
async fn signup_validates_email_and_password() {
    let config = TestConfig::default();
    let app = test_app(&config).await;

    let (status, _) = send(
        app.router.clone(),
        "POST",
        "/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "segredo123", "nome": "X", "regiao": "Amazônia - Acre" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        app.router,
        "POST",
        "/signup",
        None,
        Some(json!({ "email": "x@example.com", "password": "123", "nome": "X", "regiao": "Amazônia - Acre" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Password must have at least 6 characters");
}

#[tokio::test]
async fn login_without_provider_is_unavailable() {
    let config = TestConfig {
        supabase_url: String::new(),
        ..TestConfig::default()
    };
    let app = test_app(&config).await;

    let (status, _) = send(
        app.router,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "x@example.com", "password": "segredo123" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn login_returns_session_and_profile() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("dra@example.com").with_name("Dra. Maria");

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockSupabaseResponses::session_response(&doctor, "access-123")),
        )
        .mount(&server)
        .await;

    let config = config_for(&server);
    let app = test_app(&config).await;
    app.profiles
        .register(
            NewProfile {
                id: doctor.id.clone(),
                email: doctor.email.clone(),
                name: doctor.name.clone(),
                role: UserRole::Doctor,
                region: None,
                age: None,
                crm: Some("CRM 1".to_string()),
                specialty: Some("Pediatria".to_string()),
            },
            None,
        )
        .await
        .unwrap();

    let (status, json) = send(
        app.router,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "dra@example.com", "password": "segredo123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["access_token"], "access-123");
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["profile"]["especialidade"], "Pediatria");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let app = test_app(&config).await;

    let (status, json) = send(
        app.router,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "x@example.com", "password": "errada" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid email or password");
}

#[tokio::test]
async fn validate_and_verify_tokens() {
    let config = TestConfig::default();
    let app = test_app(&config).await;
    let user = TestUser::patient("p@example.com");

    let token = user.token(&config);
    let (status, json) = send(app.router.clone(), "POST", "/validate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);
    assert_eq!(json["user_id"], user.id.as_str());
    assert_eq!(json["role"], "paciente");

    let expired = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);
    let (status, _) = send(app.router.clone(), "POST", "/validate", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(app.router, "POST", "/verify", Some(&expired), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], false);
}

#[tokio::test]
async fn me_returns_identity_without_profile() {
    let config = TestConfig::default();
    let app = test_app(&config).await;
    let user = TestUser::patient("p@example.com").with_name("Paula");

    let (status, json) = send(app.router, "GET", "/me", Some(&user.token(&config)), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["id"], user.id.as_str());
    assert_eq!(json["user"]["metadata"]["nome"], "Paula");
    assert!(json["profile"].is_null());
}

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chat_cell::{chat_routes, ChatService};
use consultation_cell::{ConsultationService, CreateConsultationRequest, LocalConsultationRepository};
use notification_cell::NotificationService;
use profile_cell::{LocalProfileRepository, ProfileService};
use shared_database::LocalStore;
use shared_utils::test_utils::{TestConfig, TestUser};

struct TestApp {
    router: Router,
    patient: TestUser,
    doctor: TestUser,
    consultation_id: String,
}

async fn setup(config: &TestConfig) -> TestApp {
    let store = Arc::new(LocalStore::in_memory());
    let consultations = Arc::new(ConsultationService::new(
        Arc::new(LocalConsultationRepository::new(store.clone())),
        Arc::new(ProfileService::new(Arc::new(LocalProfileRepository::new(store.clone())))),
        Arc::new(NotificationService::new(store.clone())),
    ));
    let patient = TestUser::patient("maria@example.com");
    let doctor = TestUser::doctor("ana@example.com");

    let created = consultations
        .create(
            &patient.to_user(),
            CreateConsultationRequest { description: "febre".to_string(), attachments: Vec::new() },
            "token",
        )
        .await
        .unwrap();
    consultations.accept(&doctor.to_user(), &created.id, "token").await.unwrap();

    let service = Arc::new(ChatService::new(store, consultations));
    TestApp {
        router: chat_routes(config.to_arc(), service),
        patient,
        doctor,
        consultation_id: created.id,
    }
}

async fn send(app: &Router, method: Method, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn conversation_round_trip() {
    let config = TestConfig::default();
    let app = setup(&config).await;
    let uri = format!("/{}/messages", app.consultation_id);

    let (status, message) = send(
        &app.router,
        Method::POST,
        &uri,
        &app.patient.token(&config),
        Some(json!({ "conteudo": "Bom dia, doutora" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender"], "paciente");
    assert_eq!(message["kind"], "texto");

    let (status, transcript) = send(&app.router, Method::GET, &uri, &app.doctor.token(&config), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcript["status"], "aceita");
    assert_eq!(transcript["messages"][0]["content"], "Consulta iniciada");
    assert_eq!(transcript["messages"][1]["content"], "Bom dia, doutora");
}

#[tokio::test]
async fn call_controls() {
    let config = TestConfig::default();
    let app = setup(&config).await;
    let token = app.doctor.token(&config);
    let base = format!("/{}/call", app.consultation_id);

    let (status, state) = send(&app.router, Method::POST, &format!("{}/start", base), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["call_active"], true);

    let (_, state) = send(&app.router, Method::POST, &format!("{}/video", base), &token, None).await;
    assert_eq!(state["video_enabled"], false);

    let (_, state) = send(&app.router, Method::GET, &base, &app.patient.token(&config), None).await;
    assert_eq!(state["call_active"], true);
    assert_eq!(state["video_enabled"], false);

    let (_, state) = send(&app.router, Method::POST, &format!("{}/end", base), &token, None).await;
    assert_eq!(state["call_active"], false);
}

#[tokio::test]
async fn finish_then_post_is_conflict() {
    let config = TestConfig::default();
    let app = setup(&config).await;

    let (status, finished) = send(
        &app.router,
        Method::POST,
        &format!("/{}/finish", app.consultation_id),
        &app.doctor.token(&config),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "finalizada");
    assert_eq!(finished["finalizada_por"], "medico");

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/{}/messages", app.consultation_id),
        &app.patient.token(&config),
        Some(json!({ "content": "ainda aí?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn strangers_are_forbidden() {
    let config = TestConfig::default();
    let app = setup(&config).await;
    let stranger = TestUser::patient("joao@example.com");

    let (status, _) = send(
        &app.router,
        Method::GET,
        &format!("/{}/messages", app.consultation_id),
        &stranger.token(&config),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

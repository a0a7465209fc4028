#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use admitdesk::admitdesk_auth::{
    ContextOptions, InMemoryProfileStore, LocalAuthBackend, UserProfile, hash_password_with_cost,
};
use admitdesk::admitdesk_config::{CorsConfig, JwtConfig};
use admitdesk::router::init_router;
use admitdesk::state::AppState;

pub const PASSWORD: &str = "testpass123";

/// Accounts seeded into every test app: one per role, plus one without a
/// profile row and one with a role name the tables do not know.
pub const ACCOUNTS: &[(&str, Option<&str>)] = &[
    ("sales@admitdesk.test", Some("sales")),
    ("manager@admitdesk.test", Some("manager")),
    ("chief@admitdesk.test", Some("chief")),
    ("admin@admitdesk.test", Some("admin")),
    ("noprofile@admitdesk.test", None),
    ("intern@admitdesk.test", Some("intern")),
];

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup_test_app() -> TestApp {
    let backend = LocalAuthBackend::new(JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    });
    let profiles = InMemoryProfileStore::new();
    // Minimum cost keeps the suite fast.
    let hash = hash_password_with_cost(PASSWORD, 4).unwrap();

    for (email, role) in ACCOUNTS {
        let id = backend.add_account(email, &hash).await;
        if let Some(role) = role {
            profiles.upsert(UserProfile::new(id, *role)).await;
        }
    }

    let state = AppState::new(
        Arc::new(backend),
        Arc::new(profiles),
        ContextOptions::default(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    );

    TestApp {
        router: init_router(state.clone()),
        state,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(session) = session {
        builder = builder.header("authorization", format!("Bearer {}", session));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post(
    app: &Router,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(session) = session {
        builder = builder.header("authorization", format!("Bearer {}", session));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&body).unwrap())
        }
        None => Body::empty(),
    };
    send(app, builder.body(body).unwrap()).await
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post(
        app,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

/// Signs in the seeded account and returns its session id.
pub async fn session_for(app: &Router, email: &str) -> String {
    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", email, body);
    body["session_id"].as_str().unwrap().to_string()
}

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use uuid::Uuid;

use admitdesk_auth::{
    AuthBackend, AuthContext, AuthStatus, ContextOptions, HostedAuthBackend, HostedProfileStore,
    ProfileError, ProfileStore, ProviderError, SessionClient,
};
use admitdesk_config::DataStoreConfig;
use admitdesk_rbac::{Action, AssignedRole, Feature, Role, role_permissions};

const ANON_KEY: &str = "public-anon-key";
const USER_ID: &str = "0b8e2a4c-61f1-4a53-9f0e-5a0c2f3d7e11";
const EMAIL: &str = "officer@example.com";
const PASSWORD: &str = "correct-password";
const ACCESS_TOKEN: &str = "access-token-1";
const REFRESH_TOKEN: &str = "refresh-token-1";

fn has_api_key(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(ANON_KEY)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn token_body() -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": REFRESH_TOKEN,
        "user": { "id": USER_ID, "email": EMAIL }
    })
}

async fn token(
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_api_key(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "No API key found" }))).into_response();
    }

    match query.get("grant_type").map(String::as_str) {
        Some("password") if body["email"] == EMAIL && body["password"] == PASSWORD => {
            Json(token_body()).into_response()
        }
        Some("password") => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response(),
        Some("refresh_token") if body["refresh_token"] == REFRESH_TOKEN => {
            Json(token_body()).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_code": "refresh_token_not_found", "msg": "Invalid Refresh Token" })),
        )
            .into_response(),
    }
}

async fn user(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(ACCESS_TOKEN) if has_api_key(&headers) => {
            Json(json!({ "id": USER_ID, "email": EMAIL })).into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "code": 401, "msg": "JWT expired" }))).into_response(),
    }
}

async fn logout(headers: HeaderMap) -> StatusCode {
    match bearer(&headers) {
        Some(ACCESS_TOKEN) => StatusCode::NO_CONTENT,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn profiles(Query(query): Query<HashMap<String, String>>, headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(ACCESS_TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "JWT expired" }))).into_response();
    }

    let wanted = format!("eq.{}", USER_ID);
    if query.get("id") == Some(&wanted) {
        Json(json!([{ "id": USER_ID, "email": EMAIL, "role": "manager", "first_name": "Ada" }]))
            .into_response()
    } else {
        Json(json!([])).into_response()
    }
}

async fn spawn_data_store() -> DataStoreConfig {
    let app = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/user", get(user))
        .route("/auth/v1/logout", post(logout))
        .route("/rest/v1/users", get(profiles));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    DataStoreConfig {
        url: format!("http://{}", addr),
        anon_key: ANON_KEY.to_string(),
    }
}

#[tokio::test]
async fn test_hosted_sign_in_and_get_user() {
    let backend = HostedAuthBackend::new(spawn_data_store().await);

    let session = backend.sign_in_with_password(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(session.access_token, ACCESS_TOKEN);
    assert_eq!(session.refresh_token.as_deref(), Some(REFRESH_TOKEN));
    assert!(!session.is_expired());

    let user = backend.get_user(&session.access_token).await.unwrap();
    assert_eq!(user.id, USER_ID.parse::<Uuid>().unwrap());
    assert_eq!(user.email, EMAIL);
}

#[tokio::test]
async fn test_hosted_invalid_credentials() {
    let backend = HostedAuthBackend::new(spawn_data_store().await);

    let result = backend.sign_in_with_password(EMAIL, "wrong").await;
    assert_eq!(result, Err(ProviderError::InvalidCredentials));
}

#[tokio::test]
async fn test_hosted_rejection_carries_message() {
    let backend = HostedAuthBackend::new(spawn_data_store().await);

    let result = backend.get_user("stale-token").await;
    assert_eq!(
        result,
        Err(ProviderError::Rejected {
            status: 401,
            message: "JWT expired".to_string()
        })
    );

    let result = backend.refresh("unknown").await;
    assert!(matches!(result, Err(ProviderError::Rejected { status: 400, .. })));
}

#[tokio::test]
async fn test_hosted_sign_out() {
    let backend = HostedAuthBackend::new(spawn_data_store().await);

    assert_eq!(backend.sign_out(ACCESS_TOKEN).await, Ok(()));
    assert!(backend.sign_out("other").await.is_err());
}

#[tokio::test]
async fn test_hosted_backend_unreachable() {
    let backend = HostedAuthBackend::new(DataStoreConfig {
        url: "http://127.0.0.1:1".to_string(),
        anon_key: ANON_KEY.to_string(),
    });

    let result = backend.sign_in_with_password(EMAIL, PASSWORD).await;
    assert!(matches!(result, Err(ProviderError::Transport(_))));
}

#[tokio::test]
async fn test_hosted_profile_lookup() {
    let store = HostedProfileStore::new(spawn_data_store().await);
    let id: Uuid = USER_ID.parse().unwrap();

    let profile = store.fetch_profile(id, ACCESS_TOKEN).await.unwrap().unwrap();
    assert_eq!(profile.role.as_deref(), Some("manager"));
    assert_eq!(profile.first_name.as_deref(), Some("Ada"));
    assert!(profile.phone.is_none());

    let missing = store.fetch_profile(Uuid::new_v4(), ACCESS_TOKEN).await;
    assert_eq!(missing, Ok(None));

    let rejected = store.fetch_profile(id, "stale-token").await;
    assert!(matches!(rejected, Err(ProfileError::Rejected { status: 401, .. })));
}

#[tokio::test]
async fn test_context_over_hosted_store() {
    let config = spawn_data_store().await;
    let client = Arc::new(SessionClient::new(Arc::new(HostedAuthBackend::new(config.clone()))));
    let context = AuthContext::start(
        client,
        Arc::new(HostedProfileStore::new(config)),
        ContextOptions::default(),
    );

    context.login(EMAIL, PASSWORD).await.unwrap();
    let snapshot = context.wait_for_settled().await;

    assert_eq!(snapshot.status, AuthStatus::Authenticated);
    let user = snapshot.user.unwrap();
    assert_eq!(user.role, AssignedRole::Known(Role::Manager));
    assert_eq!(user.first_name.as_deref(), Some("Ada"));
    assert_eq!(snapshot.permissions, role_permissions(Role::Manager));
    assert!(context.has_permission(Feature::Analytics, Action::View));
    assert!(!context.has_permission(Feature::Permissions, Action::View));

    let checked = context.check_session().await;
    assert_eq!(checked.status, AuthStatus::Authenticated);

    assert_eq!(context.logout().await, "/auth/signin");
    assert_eq!(context.status(), AuthStatus::Unauthenticated);
}

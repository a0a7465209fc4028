use axum::Json;
use axum::extract::State;
use tracing::instrument;
use utoipa::ToSchema;

use admitdesk_auth::SessionSnapshot;

use crate::middleware::auth::CurrentSession;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{LoginRequest, LoginResponse, LogoutResponse};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Sign in and open a dashboard session
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Rejected by the auth provider", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 502, description = "Auth provider unreachable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state, dto).await?;
    Ok(Json(response))
}

/// Sign out and close the session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = LogoutResponse),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Json<LogoutResponse> {
    Json(AuthService::logout(&state, session).await)
}

/// Re-validate the session with the auth provider
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current session state", body = SessionSnapshot),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn get_session(session: CurrentSession) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(AuthService::check(&session).await?))
}

/// Renew the provider tokens behind the session
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Tokens renewed", body = SessionSnapshot),
        (status = 401, description = "Missing session or refresh rejected", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh(session: CurrentSession) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(AuthService::refresh(&session).await?))
}

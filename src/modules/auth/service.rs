use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::http::StatusCode;
use tracing::{info, instrument, warn};

use admitdesk_auth::{AuthContext, AuthStatus, SessionClient, SessionSnapshot};

use crate::middleware::auth::CurrentSession;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::{LoginRequest, LoginResponse, LogoutResponse};

/// Upper bound on waiting for a context to apply its own events.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// The context's state once its pending events are applied. A context that
/// was shut down meanwhile (logout, eviction) reads as an ended session.
async fn settled(context: &AuthContext) -> Result<SessionSnapshot, AppError> {
    let snapshot = tokio::time::timeout(SETTLE_TIMEOUT, context.wait_for_settled())
        .await
        .map_err(|_| {
            AppError::new(
                StatusCode::GATEWAY_TIMEOUT,
                anyhow!("Session state did not settle in time"),
            )
        })?;

    if !context.is_running() {
        return Err(AppError::unauthorized("Session not found or expired"));
    }
    Ok(snapshot)
}

pub struct AuthService;

impl AuthService {
    /// Starts a context for a new dashboard session and signs it in. The
    /// session is only registered once sign-in succeeded.
    #[instrument(skip(state, dto), fields(email = %dto.email))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<LoginResponse, AppError> {
        let client = Arc::new(SessionClient::new(state.backend.clone()));
        let context = AuthContext::start(
            client,
            state.profiles.clone(),
            state.context_options.clone(),
        );

        if let Err(err) = context.login(&dto.email, &dto.password).await {
            context.shutdown();
            return Err(AppError::provider(err));
        }

        let snapshot = settled(&context).await?;
        if snapshot.status != AuthStatus::Authenticated {
            context.shutdown();
            let message = snapshot
                .error
                .unwrap_or_else(|| "Sign-in did not complete".to_string());
            return Err(AppError::unauthorized(message));
        }

        let session_id = state.sessions.insert(Arc::new(context)).await;
        info!(session_id = %session_id, "Dashboard session created");

        Ok(LoginResponse::new(session_id, snapshot))
    }

    #[instrument(skip_all, fields(session_id = %session.id))]
    pub async fn logout(state: &AppState, session: CurrentSession) -> LogoutResponse {
        let redirect_to = session.context.logout().await;
        if let Some(error) = session.context.error() {
            warn!(error = %error, "Provider sign-out failed, session dropped anyway");
        }
        state.sessions.remove(session.id).await;

        LogoutResponse { redirect_to }
    }

    #[instrument(skip_all, fields(session_id = %session.id))]
    pub async fn check(session: &CurrentSession) -> Result<SessionSnapshot, AppError> {
        session.context.check_session().await;
        settled(&session.context).await
    }

    #[instrument(skip_all, fields(session_id = %session.id))]
    pub async fn refresh(session: &CurrentSession) -> Result<SessionSnapshot, AppError> {
        session
            .context
            .refresh_session()
            .await
            .map_err(AppError::provider)?;
        settled(&session.context).await
    }
}

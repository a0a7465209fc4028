//! The per-session auth context.
//!
//! A context owns one [`SessionClient`] and mirrors its events into a
//! [`SessionSnapshot`]: who is signed in, with which role, and the permission
//! list resolved for that role.
//!
//! ```text
//! unauthenticated --login--> loading --SignedIn applied--> authenticated
//! authenticated --logout / SignedOut--> unauthenticated
//! authenticated --check/refresh--> loading --> authenticated
//! ```
//!
//! State is written by the context's listener task and by the context's own
//! operations (`login`, `logout`, `check_session`, `refresh_session`), which
//! run one at a time; everyone else reads snapshots. `login` does not touch
//! the state on success: the `SignedIn` event does, shortly after. Use
//! [`AuthContext::wait_for_settled`] to observe it.
//!
//! The permission list is computed once per sign-in and kept until the next
//! one. Token refreshes, session checks and profile updates do not recompute
//! it while a user is held.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use admitdesk_config::SessionConfig;
use admitdesk_rbac::{Action, AssignedRole, Feature, Permission, Role, get_permissions_by_role, has_permission};

use crate::client::SessionClient;
use crate::error::ProviderError;
use crate::profile::{ProfileStore, UserProfile};
use crate::session::{AuthEvent, AuthEventKind, AuthSession, ProviderUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Loading,
    Authenticated,
}

/// The signed-in user as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    #[schema(value_type = String, example = "manager")]
    pub role: AssignedRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl SessionUser {
    /// Builds the user from the provider identity and an optional profile
    /// row. A missing profile or role column yields `default_role`.
    pub fn resolve(user: &ProviderUser, profile: Option<UserProfile>, default_role: Role) -> Self {
        let role = profile
            .as_ref()
            .and_then(|profile| profile.role.as_deref())
            .map(AssignedRole::parse)
            .unwrap_or(AssignedRole::Known(default_role));

        let profile = profile.unwrap_or_else(|| UserProfile {
            role: None,
            ..UserProfile::new(user.id, String::new())
        });

        Self {
            id: user.id,
            email: user.email.clone(),
            role,
            first_name: profile.first_name,
            last_name: profile.last_name,
            phone: profile.phone,
            avatar_url: profile.avatar_url,
        }
    }
}

/// A point-in-time copy of a context's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub status: AuthStatus,
    pub user: Option<SessionUser>,
    pub permissions: Vec<Permission>,
    /// Last provider or profile error, as display text.
    pub error: Option<String>,
}

impl SessionSnapshot {
    fn sign_out(&mut self) {
        self.status = AuthStatus::Unauthenticated;
        self.user = None;
        self.permissions.clear();
    }
}

#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Role assumed when the user has no profile row or role column.
    pub default_role: Role,
    /// Route handed back by [`AuthContext::logout`].
    pub sign_in_route: String,
}

impl Default for ContextOptions {
    fn default() -> Self {
        SessionConfig::default().into()
    }
}

impl From<SessionConfig> for ContextOptions {
    fn from(config: SessionConfig) -> Self {
        Self {
            default_role: config.default_role,
            sign_in_route: config.sign_in_route,
        }
    }
}

impl From<&SessionConfig> for ContextOptions {
    fn from(config: &SessionConfig) -> Self {
        config.clone().into()
    }
}

/// How far the listener got through the client's events.
#[derive(Debug, Clone, Copy, Default)]
struct Progress {
    applied: u64,
    stopped: bool,
}

/// State shared between the context and its listener task.
struct Resolver {
    profiles: Arc<dyn ProfileStore>,
    options: ContextOptions,
    state: watch::Sender<SessionSnapshot>,
    progress: watch::Sender<Progress>,
}

impl Resolver {
    async fn resolve_user(&self, session: &AuthSession) -> (SessionUser, Option<String>) {
        let default_role = self.options.default_role;
        match self
            .profiles
            .fetch_profile(session.user.id, &session.access_token)
            .await
        {
            Ok(Some(profile)) => (SessionUser::resolve(&session.user, Some(profile), default_role), None),
            Ok(None) => {
                debug!(user_id = %session.user.id, role = %default_role, "No profile, using default role");
                (SessionUser::resolve(&session.user, None, default_role), None)
            }
            Err(err) => {
                warn!(user_id = %session.user.id, error = %err, "Profile lookup failed, using default role");
                (
                    SessionUser::resolve(&session.user, None, default_role),
                    Some(err.to_string()),
                )
            }
        }
    }

    async fn establish(&self, session: &AuthSession) {
        self.state.send_modify(|state| state.status = AuthStatus::Loading);

        let (user, error) = self.resolve_user(session).await;
        let permissions = get_permissions_by_role(&user.role).to_vec();
        info!(user_id = %user.id, role = %user.role, "Session authenticated");

        self.state.send_modify(|state| {
            state.status = AuthStatus::Authenticated;
            state.user = Some(user);
            state.permissions = permissions;
            state.error = error;
        });
    }

    /// Refreshes profile fields only; role and permissions stay as they were
    /// at sign-in.
    async fn update_profile(&self, session: &AuthSession) {
        let (fresh, error) = self.resolve_user(session).await;
        self.state.send_modify(|state| {
            if let Some(user) = state.user.as_mut().filter(|user| user.id == fresh.id) {
                user.email = fresh.email;
                user.first_name = fresh.first_name;
                user.last_name = fresh.last_name;
                user.phone = fresh.phone;
                user.avatar_url = fresh.avatar_url;
            }
            if error.is_some() {
                state.error = error;
            }
        });
    }

    async fn apply(&self, event: AuthEvent) {
        debug!(kind = ?event.kind, "Applying auth event");
        match (event.kind, event.session) {
            (AuthEventKind::SignedIn, Some(session)) => self.establish(&session).await,
            (AuthEventKind::SignedOut, _) => self.state.send_modify(SessionSnapshot::sign_out),
            (AuthEventKind::TokenRefreshed, _) => self.state.send_modify(|state| {
                if state.user.is_some() {
                    state.status = AuthStatus::Authenticated;
                }
            }),
            (AuthEventKind::UserUpdated, Some(session)) => self.update_profile(&session).await,
            (kind, None) => warn!(?kind, "Auth event without a session, ignoring"),
        }
    }

    fn mark_applied(&self, count: u64) {
        self.progress.send_modify(|progress| progress.applied += count);
    }

    fn mark_stopped(&self) {
        self.progress.send_modify(|progress| progress.stopped = true);
    }
}

/// Marks the listener stopped however its task ends: closed channel, abort
/// or panic.
struct StopGuard(Arc<Resolver>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.mark_stopped();
    }
}

pub struct AuthContext {
    client: Arc<SessionClient>,
    resolver: Arc<Resolver>,
    listener: JoinHandle<()>,
    /// Serializes the context's own state-writing operations.
    ops: Mutex<()>,
}

impl AuthContext {
    /// Creates a context and spawns its listener on the current tokio runtime.
    pub fn start(
        client: Arc<SessionClient>,
        profiles: Arc<dyn ProfileStore>,
        options: ContextOptions,
    ) -> Self {
        let mut events = client.subscribe();
        let (state, _) = watch::channel(SessionSnapshot::default());
        let (progress, _) = watch::channel(Progress {
            applied: client.emitted_events(),
            stopped: false,
        });

        let resolver = Arc::new(Resolver {
            profiles,
            options,
            state,
            progress,
        });

        let task_resolver = Arc::clone(&resolver);
        let listener = tokio::spawn(async move {
            let _guard = StopGuard(Arc::clone(&task_resolver));
            loop {
                match events.recv().await {
                    Ok(event) => {
                        task_resolver.apply(event).await;
                        task_resolver.mark_applied(1);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Auth context fell behind, events dropped");
                        task_resolver.mark_applied(skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self {
            client,
            resolver,
            listener,
            ops: Mutex::new(()),
        }
    }

    /// Stops the listener. Later provider events are no longer applied.
    pub fn shutdown(&self) {
        self.listener.abort();
        self.resolver.mark_stopped();
    }

    /// False once the context was shut down or its listener ended.
    pub fn is_running(&self) -> bool {
        !self.resolver.progress.borrow().stopped && !self.listener.is_finished()
    }

    /// Asks the provider to sign in. State changes arrive with the
    /// `SignedIn` event, not on return; a failure is recorded in `error`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ProviderError> {
        let _op = self.ops.lock().await;
        match self.client.sign_in(email, password).await {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Login failed");
                let message = err.to_string();
                self.resolver
                    .state
                    .send_modify(|state| state.error = Some(message));
                Err(err)
            }
        }
    }

    /// Signs out with the provider, clears local state and returns the route
    /// the caller should navigate to. A provider failure is recorded but does
    /// not keep the user signed in locally.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> String {
        let _op = self.ops.lock().await;
        let error = self.client.sign_out().await.err().map(|err| err.to_string());
        self.resolver.state.send_modify(|state| {
            state.sign_out();
            state.error = error;
        });
        info!("Signed out");
        self.resolver.options.sign_in_route.clone()
    }

    /// Re-validates the current provider session.
    ///
    /// A held user keeps the role and permissions resolved at sign-in. Only
    /// a context holding no user resolves them here, for a provider session
    /// whose `SignedIn` event it never applied.
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> SessionSnapshot {
        let _op = self.ops.lock().await;
        // Apply any sign-in still queued before deciding who is held.
        self.wait_for_settled().await;
        let held = self.resolver.state.borrow().user.as_ref().map(|user| user.id);

        self.resolver
            .state
            .send_modify(|state| state.status = AuthStatus::Loading);

        match self.client.get_session().await {
            Ok(Some(session)) => match held {
                Some(id) if id == session.user.id => {
                    self.resolver.state.send_modify(|state| {
                        state.status = AuthStatus::Authenticated;
                        state.error = None;
                    });
                }
                None if self.is_running() => self.resolver.establish(&session).await,
                None => self.resolver.state.send_modify(SessionSnapshot::sign_out),
                Some(id) => {
                    warn!(held = %id, provider = %session.user.id, "Provider session belongs to another user");
                    self.resolver.state.send_modify(|state| {
                        state.sign_out();
                        state.error = Some("Session user changed, sign in again".to_string());
                    });
                }
            },
            Ok(None) => self.resolver.state.send_modify(SessionSnapshot::sign_out),
            Err(err) => {
                warn!(error = %err, "Session check failed");
                let message = err.to_string();
                self.resolver.state.send_modify(|state| {
                    state.sign_out();
                    state.error = Some(message);
                });
            }
        }

        self.snapshot()
    }

    /// Renews the provider tokens. Permissions are left untouched.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<(), ProviderError> {
        let _op = self.ops.lock().await;
        self.resolver
            .state
            .send_modify(|state| state.status = AuthStatus::Loading);

        match self.client.refresh_session().await {
            Ok(_) => {
                self.resolver.state.send_modify(|state| {
                    state.status = if state.user.is_some() {
                        AuthStatus::Authenticated
                    } else {
                        AuthStatus::Unauthenticated
                    };
                });
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                self.resolver.state.send_modify(|state| {
                    state.sign_out();
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Reloads the user from the provider; profile fields update through the
    /// `UserUpdated` event.
    pub async fn reload_user(&self) -> Result<(), ProviderError> {
        self.client.reload_user().await.map(|_| ())
    }

    pub fn has_permission(&self, feature: Feature, action: Action) -> bool {
        has_permission(&self.resolver.state.borrow().permissions, feature, action)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.resolver.state.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.resolver.state.borrow().status
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.resolver.state.borrow().user.clone()
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.resolver.state.borrow().permissions.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.resolver.state.borrow().error.clone()
    }

    /// Waits until every event the client has emitted so far was applied,
    /// or returns right away once the listener has stopped.
    pub async fn wait_for_settled(&self) -> SessionSnapshot {
        let target = self.client.emitted_events();
        let mut progress = self.resolver.progress.subscribe();
        // The sender lives in `self.resolver`, so the channel cannot close here.
        let _ = progress
            .wait_for(|progress| progress.stopped || progress.applied >= target)
            .await;
        self.snapshot()
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Per-session client over a stateless [`AuthBackend`].
//!
//! The client remembers the current [`AuthSession`] and broadcasts every
//! change to subscribers, the way a browser SDK notifies its listeners. It
//! never retries a failed call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, instrument, warn};

use crate::backend::AuthBackend;
use crate::error::ProviderError;
use crate::session::{AuthEvent, AuthEventKind, AuthSession};

const EVENT_CAPACITY: usize = 16;

pub struct SessionClient {
    backend: Arc<dyn AuthBackend>,
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
    emitted: AtomicU64,
}

impl SessionClient {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            session: Mutex::new(None),
            events,
            emitted: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Number of events emitted so far, including ones nobody received.
    pub fn emitted_events(&self) -> u64 {
        self.emitted.load(Ordering::SeqCst)
    }

    fn emit(&self, kind: AuthEventKind, session: Option<AuthSession>) {
        // Counted before sending so a waiter never misses an in-flight event.
        self.emitted.fetch_add(1, Ordering::SeqCst);
        // No subscribers is not an error.
        let _ = self.events.send(AuthEvent::new(kind, session));
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ProviderError> {
        let session = self.backend.sign_in_with_password(email, password).await?;
        *self.session.lock().await = Some(session.clone());
        debug!(user_id = %session.user.id, "Signed in");
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Drops the local session even when the backend call fails; the
    /// backend's error is still returned.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), ProviderError> {
        let previous = self.session.lock().await.take();
        let result = match &previous {
            Some(session) => self.backend.sign_out(&session.access_token).await,
            None => Ok(()),
        };
        if let Err(err) = &result {
            warn!(error = %err, "Backend sign-out failed, local session cleared anyway");
        }
        self.emit(AuthEventKind::SignedOut, None);
        result
    }

    /// The stored session after confirming it with the backend.
    ///
    /// An expired session is refreshed first when a refresh token exists.
    #[instrument(skip(self))]
    pub async fn get_session(&self) -> Result<Option<AuthSession>, ProviderError> {
        let Some(session) = self.session.lock().await.clone() else {
            return Ok(None);
        };

        if session.is_expired() {
            return self.refresh_session().await.map(Some);
        }

        let user = self.backend.get_user(&session.access_token).await?;
        let mut guard = self.session.lock().await;
        match guard.as_mut() {
            Some(current) if current.access_token == session.access_token => {
                current.user = user;
                Ok(Some(current.clone()))
            }
            // Replaced or cleared while the backend was answering.
            other => Ok(other.map(|current| current.clone())),
        }
    }

    /// Exchanges the refresh token for a new session. On failure the local
    /// session is dropped and `SignedOut` is emitted.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<AuthSession, ProviderError> {
        let refresh_token = self
            .session
            .lock()
            .await
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
            .ok_or(ProviderError::NoSession)?;

        match self.backend.refresh(&refresh_token).await {
            Ok(session) => {
                *self.session.lock().await = Some(session.clone());
                self.emit(AuthEventKind::TokenRefreshed, Some(session.clone()));
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, signing out locally");
                self.session.lock().await.take();
                self.emit(AuthEventKind::SignedOut, None);
                Err(err)
            }
        }
    }

    /// Re-reads the user from the backend and emits `UserUpdated`.
    #[instrument(skip(self))]
    pub async fn reload_user(&self) -> Result<AuthSession, ProviderError> {
        let session = self
            .session
            .lock()
            .await
            .clone()
            .ok_or(ProviderError::NoSession)?;

        let user = self.backend.get_user(&session.access_token).await?;
        let updated = AuthSession { user, ..session };
        *self.session.lock().await = Some(updated.clone());
        self.emit(AuthEventKind::UserUpdated, Some(updated.clone()));
        Ok(updated)
    }

    pub async fn current_session(&self) -> Option<AuthSession> {
        self.session.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalAuthBackend;
    use crate::password::hash_password_with_cost;
    use admitdesk_config::JwtConfig;

    async fn client() -> SessionClient {
        let backend = LocalAuthBackend::new(JwtConfig {
            secret: "client-test-secret".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 7200,
        });
        let hash = hash_password_with_cost("password123", 4).unwrap();
        backend.add_account("staff@example.com", &hash).await;
        SessionClient::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_sign_in_emits_signed_in() {
        let client = client().await;
        let mut events = client.subscribe();

        let session = client.sign_in("staff@example.com", "password123").await.unwrap();
        let event = events.recv().await.unwrap();

        assert_eq!(event.kind, AuthEventKind::SignedIn);
        assert_eq!(event.session, Some(session.clone()));
        assert_eq!(client.current_session().await, Some(session));
    }

    #[tokio::test]
    async fn test_failed_sign_in_emits_nothing() {
        let client = client().await;
        let mut events = client.subscribe();

        let result = client.sign_in("staff@example.com", "wrong").await;
        assert_eq!(result, Err(ProviderError::InvalidCredentials));
        assert!(events.try_recv().is_err());
        assert!(client.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_and_emits() {
        let client = client().await;
        client.sign_in("staff@example.com", "password123").await.unwrap();
        let mut events = client.subscribe();

        client.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::SignedOut);
        assert!(client.current_session().await.is_none());
        assert_eq!(client.get_session().await, Ok(None));
    }

    #[tokio::test]
    async fn test_get_session_confirms_with_backend() {
        let client = client().await;
        let session = client.sign_in("staff@example.com", "password123").await.unwrap();

        let confirmed = client.get_session().await.unwrap().unwrap();
        assert_eq!(confirmed.user.id, session.user.id);
    }

    #[tokio::test]
    async fn test_refresh_emits_token_refreshed() {
        let client = client().await;
        let session = client.sign_in("staff@example.com", "password123").await.unwrap();
        let mut events = client.subscribe();

        let refreshed = client.refresh_session().await.unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::TokenRefreshed);
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let client = client().await;
        assert_eq!(client.refresh_session().await, Err(ProviderError::NoSession));
    }

    #[tokio::test]
    async fn test_reload_user_emits_user_updated() {
        let client = client().await;
        client.sign_in("staff@example.com", "password123").await.unwrap();
        let mut events = client.subscribe();

        client.reload_user().await.unwrap();
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::UserUpdated);
    }
}

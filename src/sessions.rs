//! Live auth contexts, one per signed-in dashboard session.
//!
//! Each entry is keyed by an opaque session id handed to the client at login
//! and sent back as `Authorization: Bearer <session id>`.
//!
//! Sessions leave the registry on logout, when they sit unused past the idle
//! timeout, or when a sweep finds their context no longer signed in.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use admitdesk_auth::{AuthContext, AuthStatus};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

struct Entry {
    context: Arc<AuthContext>,
    last_seen: Instant,
}

impl Entry {
    fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.last_seen.elapsed() > idle_timeout
    }

    fn is_live(&self, idle_timeout: Duration) -> bool {
        !self.is_idle(idle_timeout)
            && self.context.is_running()
            && self.context.status() != AuthStatus::Unauthenticated
    }
}

pub struct SessionRegistry {
    contexts: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            contexts: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn insert(&self, context: Arc<AuthContext>) -> Uuid {
        let id = Uuid::new_v4();
        let entry = Entry {
            context,
            last_seen: Instant::now(),
        };
        self.contexts.write().await.insert(id, entry);
        debug!(session_id = %id, "Session registered");
        id
    }

    /// Looks up a session and marks it used. An idle session is evicted
    /// instead.
    pub async fn get(&self, id: Uuid) -> Option<Arc<AuthContext>> {
        let mut contexts = self.contexts.write().await;
        let entry = contexts.get_mut(&id)?;
        if !entry.is_idle(self.idle_timeout) {
            entry.last_seen = Instant::now();
            return Some(Arc::clone(&entry.context));
        }

        if let Some(entry) = contexts.remove(&id) {
            entry.context.shutdown();
            debug!(session_id = %id, "Idle session evicted");
        }
        None
    }

    /// Removes the session and stops its listener.
    pub async fn remove(&self, id: Uuid) -> Option<Arc<AuthContext>> {
        let entry = self.contexts.write().await.remove(&id)?;
        entry.context.shutdown();
        debug!(session_id = %id, "Session removed");
        Some(entry.context)
    }

    /// Evicts idle sessions and sessions that are no longer signed in.
    /// Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut contexts = self.contexts.write().await;
        let before = contexts.len();
        contexts.retain(|id, entry| {
            let live = entry.is_live(self.idle_timeout);
            if !live {
                entry.context.shutdown();
                debug!(session_id = %id, "Session evicted");
            }
            live
        });
        before - contexts.len()
    }

    /// Runs [`SessionRegistry::sweep`] every `every` on the current runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = registry.sweep().await;
                if evicted > 0 {
                    let remaining = registry.len().await;
                    info!(evicted, remaining, "Swept dashboard sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_auth::{
        ContextOptions, InMemoryProfileStore, LocalAuthBackend, SessionClient,
        hash_password_with_cost,
    };
    use admitdesk_config::JwtConfig;

    fn backend() -> LocalAuthBackend {
        LocalAuthBackend::new(JwtConfig {
            secret: "registry-test-secret".to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 120,
        })
    }

    fn start(backend: LocalAuthBackend) -> Arc<AuthContext> {
        let client = Arc::new(SessionClient::new(Arc::new(backend)));
        Arc::new(AuthContext::start(
            client,
            Arc::new(InMemoryProfileStore::new()),
            ContextOptions::default(),
        ))
    }

    fn context() -> Arc<AuthContext> {
        start(backend())
    }

    async fn signed_in_context() -> Arc<AuthContext> {
        let backend = backend();
        let hash = hash_password_with_cost("pw", 4).unwrap();
        backend.add_account("user@example.com", &hash).await;

        let context = start(backend);
        context.login("user@example.com", "pw").await.unwrap();
        context.wait_for_settled().await;
        context
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::default();
        assert!(registry.is_empty().await);

        let id = registry.insert(context()).await;
        let found = registry.get(id).await.unwrap();
        assert_eq!(found.status(), AuthStatus::Unauthenticated);
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(id).await.is_some());
        assert!(registry.get(id).await.is_none());
        assert!(registry.remove(id).await.is_none());
        assert!(!found.is_running());
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let registry = SessionRegistry::default();
        registry.insert(context()).await;
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_idle_session_is_evicted_on_lookup() {
        let registry = SessionRegistry::new(Duration::from_millis(20));
        let context = signed_in_context().await;
        let id = registry.insert(Arc::clone(&context)).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(registry.get(id).await.is_none());
        assert!(registry.is_empty().await);
        assert!(!context.is_running());
    }

    #[tokio::test]
    async fn test_sweep_keeps_only_live_sessions() {
        let registry = SessionRegistry::default();
        let live = registry.insert(signed_in_context().await).await;
        let signed_out = registry.insert(context()).await;

        let stopped_context = signed_in_context().await;
        stopped_context.shutdown();
        let stopped = registry.insert(stopped_context).await;

        assert_eq!(registry.sweep().await, 2);
        assert!(registry.get(live).await.is_some());
        assert!(registry.get(signed_out).await.is_none());
        assert!(registry.get(stopped).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_evicts_idle_sessions() {
        let registry = SessionRegistry::new(Duration::from_millis(20));
        registry.insert(signed_in_context().await).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(registry.sweep().await, 1);
        assert!(registry.is_empty().await);
    }
}

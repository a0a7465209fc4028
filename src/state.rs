use std::sync::Arc;

use tracing::info;

use admitdesk_auth::{
    AuthBackend, ContextOptions, HostedAuthBackend, HostedProfileStore, InMemoryProfileStore,
    LocalAuthBackend, ProfileStore, UserProfile,
};
use admitdesk_config::{AppConfig, AuthBackendKind, CorsConfig};
use admitdesk_rbac::Role;

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn AuthBackend>,
    pub profiles: Arc<dyn ProfileStore>,
    pub sessions: Arc<SessionRegistry>,
    pub context_options: ContextOptions,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        profiles: Arc<dyn ProfileStore>,
        context_options: ContextOptions,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            backend,
            profiles,
            sessions: Arc::new(SessionRegistry::default()),
            context_options,
            cors_config,
        }
    }
}

/// Builds the backend and profile store selected by `AUTH_BACKEND`.
pub async fn init_app_state(config: &AppConfig) -> AppState {
    let options = ContextOptions::from(&config.session);

    let (backend, profiles): (Arc<dyn AuthBackend>, Arc<dyn ProfileStore>) =
        match config.session.backend {
            AuthBackendKind::Hosted => {
                info!(url = %config.data_store.url, "Using hosted auth backend");
                (
                    Arc::new(HostedAuthBackend::new(config.data_store.clone())),
                    Arc::new(HostedProfileStore::new(config.data_store.clone())),
                )
            }
            AuthBackendKind::Local => {
                info!("Using local auth backend");
                let backend = LocalAuthBackend::new(config.jwt.clone());
                let profiles = InMemoryProfileStore::new();

                if let Some(seed) = &config.session.local_admin {
                    let id = backend.add_account(&seed.email, &seed.password_hash).await;
                    profiles
                        .upsert(UserProfile {
                            email: Some(seed.email.clone()),
                            ..UserProfile::new(id, Role::Admin.as_str())
                        })
                        .await;
                    info!(email = %seed.email, "Seeded local admin account");
                }

                (Arc::new(backend), Arc::new(profiles))
            }
        };

    AppState {
        sessions: Arc::new(SessionRegistry::new(config.session.idle_timeout)),
        ..AppState::new(backend, profiles, options, config.cors.clone())
    }
}

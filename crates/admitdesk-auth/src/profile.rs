//! User profiles stored next to the auth records.
//!
//! The profile row is where a staff member's role lives. The hosted store is
//! queried through its REST interface:
//!
//! ```text
//! GET /rest/v1/users?id=eq.<user id>&select=*
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use admitdesk_config::DataStoreConfig;

use crate::backend::hosted::error_message;
use crate::error::ProfileError;

const PROFILE_TABLE: &str = "users";

/// A profile row. Every column except `id` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw role name; parsed by the session context.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(id: Uuid, role: impl Into<String>) -> Self {
        Self {
            id,
            email: None,
            role: Some(role.into()),
            first_name: None,
            last_name: None,
            phone: None,
            avatar_url: None,
        }
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` means the user has no profile row.
    async fn fetch_profile(
        &self,
        user_id: Uuid,
        access_token: &str,
    ) -> Result<Option<UserProfile>, ProfileError>;
}

#[derive(Clone, Debug)]
pub struct HostedProfileStore {
    http: Client,
    config: DataStoreConfig,
}

impl HostedProfileStore {
    pub fn new(config: DataStoreConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: DataStoreConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ProfileStore for HostedProfileStore {
    #[instrument(skip(self, access_token))]
    async fn fetch_profile(
        &self,
        user_id: Uuid,
        access_token: &str,
    ) -> Result<Option<UserProfile>, ProfileError> {
        let response = self
            .http
            .get(self.config.endpoint(&format!("rest/v1/{}", PROFILE_TABLE)))
            .query(&[("id", format!("eq.{}", user_id)), ("select", "*".to_string())])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ProfileError::Rejected {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        let rows: Vec<UserProfile> = response.json().await?;
        Ok(rows.into_iter().next())
    }
}

/// Profiles held in memory, keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    pub async fn remove(&self, user_id: Uuid) -> Option<UserProfile> {
        self.profiles.write().await.remove(&user_id)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profile(
        &self,
        user_id: Uuid,
        _access_token: &str,
    ) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }
}

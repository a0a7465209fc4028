//! Client for the hosted data store's auth API.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | sign in   | `POST /auth/v1/token?grant_type=password` |
//! | refresh   | `POST /auth/v1/token?grant_type=refresh_token` |
//! | get user  | `GET /auth/v1/user` |
//! | sign out  | `POST /auth/v1/logout` |
//!
//! Every request carries the public key in the `apikey` header. Calls made
//! on behalf of a user add `Authorization: Bearer <access token>`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use admitdesk_config::DataStoreConfig;

use super::AuthBackend;
use crate::error::ProviderError;
use crate::session::{AuthSession, ProviderUser};

#[derive(Debug, Deserialize)]
struct HostedUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<HostedUser> for ProviderUser {
    fn from(user: HostedUser) -> Self {
        ProviderUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: HostedUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));

        AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user.into(),
        }
    }
}

/// Extracts the most specific message the auth API put in an error body.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn is_invalid_credentials(status: StatusCode, body: &Value) -> bool {
    if status != StatusCode::BAD_REQUEST {
        return false;
    }
    let grant = body.get("error").and_then(Value::as_str) == Some("invalid_grant");
    let code = body.get("error_code").and_then(Value::as_str) == Some("invalid_credentials");
    grant || code
}

async fn rejection(response: Response) -> ProviderError {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if is_invalid_credentials(status, &body) {
        return ProviderError::InvalidCredentials;
    }

    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });
    ProviderError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[derive(Clone, Debug)]
pub struct HostedAuthBackend {
    http: Client,
    config: DataStoreConfig,
}

impl HostedAuthBackend {
    pub fn new(config: DataStoreConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: DataStoreConfig) -> Self {
        Self { http, config }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.endpoint(path))
            .header("apikey", &self.config.anon_key)
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<AuthSession, ProviderError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("auth/v1/token?grant_type={}", grant_type),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into())
    }
}

#[async_trait]
impl AuthBackend for HostedAuthBackend {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProviderError> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        debug!(user_id = %session.user.id, "Hosted sign-in succeeded");
        Ok(session)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .request(reqwest::Method::POST, "auth/v1/logout")
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            warn!(error = %err, "Hosted sign-out rejected");
            return Err(err);
        }
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        let response = self
            .request(reqwest::Method::GET, "auth/v1/user")
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let user: HostedUser = response.json().await?;
        Ok(user.into())
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ProviderError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }
}

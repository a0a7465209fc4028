//! In-process auth backend.
//!
//! Accounts live in memory with bcrypt password hashes. Sessions are pairs of
//! HS256 JWTs signed with [`JwtConfig::secret`]:
//!
//! - **Access token**: short-lived, `kind = "access"`
//! - **Refresh token**: long-lived, `kind = "refresh"`, unique `jti`
//!
//! Signing out revokes the access token, and a refresh revokes the refresh
//! token it used. A revocation is forgotten once the token could no longer
//! pass verification anyway.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use admitdesk_config::JwtConfig;

use super::AuthBackend;
use crate::error::ProviderError;
use crate::password::verify_password;
use crate::session::{AuthSession, ProviderUser};

const ACCESS_KIND: &str = "access";
const REFRESH_KIND: &str = "refresh";

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalClaims {
    /// User ID (subject claim)
    pub sub: Uuid,
    pub email: String,
    /// `access` or `refresh`
    pub kind: String,
    /// Unique token identifier
    pub jti: String,
    /// Expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

#[derive(Debug, Clone)]
pub struct LocalAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

pub struct LocalAuthBackend {
    jwt: JwtConfig,
    accounts: RwLock<HashMap<String, LocalAccount>>,
    /// Revoked token -> its `exp`.
    revoked: RwLock<HashMap<String, i64>>,
}

/// Unix time `lifetime` seconds from now.
fn expiry(lifetime: i64) -> Result<i64, ProviderError> {
    if lifetime <= 0 {
        return Err(ProviderError::Token(format!(
            "Token lifetime must be positive, got {}",
            lifetime
        )));
    }
    Utc::now()
        .timestamp()
        .checked_add(lifetime)
        .ok_or_else(|| ProviderError::Token("Token lifetime out of range".to_string()))
}

fn timestamp_claim(seconds: i64) -> Result<usize, ProviderError> {
    usize::try_from(seconds)
        .map_err(|_| ProviderError::Token(format!("Invalid token timestamp {}", seconds)))
}

impl LocalAuthBackend {
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            jwt,
            accounts: RwLock::new(HashMap::new()),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an account from an existing bcrypt hash and returns its id.
    pub async fn add_account(&self, email: &str, password_hash: &str) -> Uuid {
        let account = LocalAccount {
            id: Uuid::new_v4(),
            email: email.trim().to_string(),
            password_hash: password_hash.to_string(),
        };
        let id = account.id;
        self.accounts
            .write()
            .await
            .insert(email.trim().to_lowercase(), account);
        info!(user_id = %id, "Registered local account");
        id
    }

    fn issue(&self, user: &ProviderUser, kind: &str, exp: i64) -> Result<String, ProviderError> {
        let claims = LocalClaims {
            sub: user.id,
            email: user.email.clone(),
            kind: kind.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: timestamp_claim(exp)?,
            iat: timestamp_claim(Utc::now().timestamp())?,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| ProviderError::Token(format!("Failed to create token: {}", e)))
    }

    fn issue_session(&self, user: ProviderUser) -> Result<AuthSession, ProviderError> {
        let expires_at = expiry(self.jwt.access_token_expiry)?;
        let access_token = self.issue(&user, ACCESS_KIND, expires_at)?;
        let refresh_token = self.issue(&user, REFRESH_KIND, expiry(self.jwt.refresh_token_expiry)?)?;

        Ok(AuthSession {
            access_token,
            refresh_token: Some(refresh_token),
            expires_at: Some(expires_at),
            user,
        })
    }

    fn verify(&self, token: &str, kind: &str) -> Result<LocalClaims, ProviderError> {
        let claims = decode::<LocalClaims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ProviderError::Rejected {
            status: 401,
            message: "Invalid or expired token".to_string(),
        })?;

        if claims.kind != kind {
            return Err(ProviderError::Rejected {
                status: 401,
                message: format!("Expected a {} token", kind),
            });
        }
        Ok(claims)
    }

    async fn ensure_not_revoked(&self, token: &str) -> Result<(), ProviderError> {
        if self.revoked.read().await.contains_key(token) {
            return Err(ProviderError::Rejected {
                status: 401,
                message: "Session has been signed out".to_string(),
            });
        }
        Ok(())
    }

    /// Records a revocation and drops the ones whose tokens have expired
    /// past the validation leeway.
    async fn revoke(&self, token: &str, claims: &LocalClaims) {
        let exp = i64::try_from(claims.exp).unwrap_or(i64::MAX);
        let leeway = i64::try_from(Validation::default().leeway).unwrap_or(i64::MAX);
        let now = Utc::now().timestamp();

        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| exp.saturating_add(leeway) >= now);
        revoked.insert(token.to_string(), exp);
    }
}

#[async_trait]
impl AuthBackend for LocalAuthBackend {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProviderError> {
        let account = self
            .accounts
            .read()
            .await
            .get(&email.trim().to_lowercase())
            .cloned()
            .ok_or(ProviderError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(ProviderError::InvalidCredentials);
        }

        self.issue_session(ProviderUser {
            id: account.id,
            email: account.email,
        })
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let claims = self.verify(access_token, ACCESS_KIND)?;
        self.revoke(access_token, &claims).await;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        self.ensure_not_revoked(access_token).await?;
        let claims = self.verify(access_token, ACCESS_KIND)?;
        Ok(ProviderUser {
            id: claims.sub,
            email: claims.email,
        })
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ProviderError> {
        self.ensure_not_revoked(refresh_token).await?;
        let claims = self.verify(refresh_token, REFRESH_KIND)?;
        // Refresh tokens are single use.
        self.revoke(refresh_token, &claims).await;
        self.issue_session(ProviderUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password_with_cost;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "local-backend-test-secret".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    async fn backend_with_account() -> (LocalAuthBackend, Uuid) {
        let backend = LocalAuthBackend::new(jwt_config());
        let hash = hash_password_with_cost("s3cret-pass", 4).unwrap();
        let id = backend.add_account("Officer@Example.com", &hash).await;
        (backend, id)
    }

    #[tokio::test]
    async fn test_sign_in_and_get_user() {
        let (backend, id) = backend_with_account().await;
        let session = backend
            .sign_in_with_password("officer@example.com", "s3cret-pass")
            .await
            .unwrap();

        assert_eq!(session.user.id, id);
        assert!(session.refresh_token.is_some());

        let user = backend.get_user(&session.access_token).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "Officer@Example.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let (backend, _) = backend_with_account().await;
        assert_eq!(
            backend.sign_in_with_password("officer@example.com", "nope").await,
            Err(ProviderError::InvalidCredentials)
        );
        assert_eq!(
            backend.sign_in_with_password("ghost@example.com", "s3cret-pass").await,
            Err(ProviderError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_sign_out_revokes_access_token() {
        let (backend, _) = backend_with_account().await;
        let session = backend
            .sign_in_with_password("officer@example.com", "s3cret-pass")
            .await
            .unwrap();

        backend.sign_out(&session.access_token).await.unwrap();
        assert!(matches!(
            backend.get_user(&session.access_token).await,
            Err(ProviderError::Rejected { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_is_single_use() {
        let (backend, id) = backend_with_account().await;
        let session = backend
            .sign_in_with_password("officer@example.com", "s3cret-pass")
            .await
            .unwrap();
        let refresh_token = session.refresh_token.unwrap();

        let renewed = backend.refresh(&refresh_token).await.unwrap();
        assert_eq!(renewed.user.id, id);
        assert!(backend.refresh(&refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_non_positive_lifetime_fails_sign_in() {
        let backend = LocalAuthBackend::new(JwtConfig {
            access_token_expiry: -1,
            ..jwt_config()
        });
        let hash = hash_password_with_cost("s3cret-pass", 4).unwrap();
        backend.add_account("officer@example.com", &hash).await;

        let result = backend
            .sign_in_with_password("officer@example.com", "s3cret-pass")
            .await;
        assert!(matches!(result, Err(ProviderError::Token(_))));
    }

    #[tokio::test]
    async fn test_expired_revocations_are_pruned() {
        let (backend, _) = backend_with_account().await;
        let now = Utc::now().timestamp();
        {
            let mut revoked = backend.revoked.write().await;
            revoked.insert("long-expired".to_string(), now - 3600);
            // Still inside the verification leeway.
            revoked.insert("just-expired".to_string(), now - 10);
        }

        let session = backend
            .sign_in_with_password("officer@example.com", "s3cret-pass")
            .await
            .unwrap();
        backend.sign_out(&session.access_token).await.unwrap();

        let revoked = backend.revoked.read().await;
        assert!(!revoked.contains_key("long-expired"));
        assert!(revoked.contains_key("just-expired"));
        assert!(revoked.contains_key(&session.access_token));
        assert_eq!(revoked.len(), 2);
    }

    #[tokio::test]
    async fn test_token_kinds_are_not_interchangeable() {
        let (backend, _) = backend_with_account().await;
        let session = backend
            .sign_in_with_password("officer@example.com", "s3cret-pass")
            .await
            .unwrap();

        assert!(backend.refresh(&session.access_token).await.is_err());
        let refresh_token = session.refresh_token.unwrap();
        assert!(backend.get_user(&refresh_token).await.is_err());
    }
}

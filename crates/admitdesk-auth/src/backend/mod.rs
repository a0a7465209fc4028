//! Stateless auth backends.
//!
//! A backend turns credentials into an [`AuthSession`] and validates tokens.
//! It keeps no notion of a "current" session; that is the job of
//! [`crate::SessionClient`].
//!
//! - [`hosted`]: the data store's hosted auth API over HTTP
//! - [`local`]: in-process accounts for development and tests

pub mod hosted;
pub mod local;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::session::{AuthSession, ProviderUser};

pub use hosted::HostedAuthBackend;
pub use local::{LocalAccount, LocalAuthBackend};

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProviderError>;

    /// Invalidates the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ProviderError>;
}

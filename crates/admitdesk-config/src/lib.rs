//! # Admitdesk Config
//!
//! Configuration types for Admitdesk, loaded from environment variables:
//!
//! - [`data_store`]: hosted data-store endpoint and public key (required)
//! - [`session`]: auth backend selection, default role, sign-in route
//! - [`jwt`]: token settings for the local auth backend
//! - [`cors`]: allowed origins
//! - [`server`]: bind address and log directory
//!
//! # Example
//!
//! ```ignore
//! use admitdesk_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("data store at {}", config.data_store.url);
//! ```

pub mod cors;
pub mod data_store;
pub mod jwt;
pub mod server;
pub mod session;

use thiserror::Error;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use data_store::DataStoreConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use session::{AuthBackendKind, LocalAdminSeed, SessionConfig};

/// Startup configuration failures. All of them are fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Reads a variable, treating an empty value as unset.
pub(crate) fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads a duration in whole seconds, which must be positive when set.
pub(crate) fn positive_seconds<F>(lookup: &F, name: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, name) else {
        return Ok(default);
    };
    match raw.parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        Ok(seconds) => Err(ConfigError::Invalid {
            name,
            reason: format!("must be a positive number of seconds, got {}", seconds),
        }),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

/// Every configuration section the server needs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_store: DataStoreConfig,
    pub session: SessionConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            data_store: DataStoreConfig::from_vars(&lookup)?,
            session: SessionConfig::from_vars(&lookup)?,
            jwt: JwtConfig::from_vars(&lookup)?,
            cors: CorsConfig::from_vars(&lookup),
            server: ServerConfig::from_vars(&lookup),
        })
    }
}

//! Session context settings.
//!
//! # Environment Variables
//!
//! - `AUTH_BACKEND`: `hosted` (default) or `local`
//! - `DEFAULT_ROLE`: role assumed when a user has no profile (default: `sales`)
//! - `SIGN_IN_ROUTE`: where clients are sent after logout (default: `/auth/signin`)
//! - `LOCAL_ADMIN_EMAIL`, `LOCAL_ADMIN_PASSWORD_HASH`: optional seed account for
//!   the local backend; both or neither must be set
//! - `SESSION_IDLE_TIMEOUT`: seconds an unused dashboard session is kept (default: 3600)
//! - `SESSION_SWEEP_INTERVAL`: seconds between eviction sweeps (default: 60)

use std::time::Duration;

use admitdesk_rbac::Role;

use crate::{ConfigError, non_empty, positive_seconds};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthBackendKind {
    /// The data store's hosted auth API.
    Hosted,
    /// In-process accounts with bcrypt hashes and locally signed tokens.
    Local,
}

/// An account registered with the local backend at startup. It is given the
/// `admin` role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalAdminSeed {
    pub email: String,
    /// bcrypt hash, as printed by `admitdesk-cli hash-password`
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub backend: AuthBackendKind,
    pub default_role: Role,
    pub sign_in_route: String,
    pub local_admin: Option<LocalAdminSeed>,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: AuthBackendKind::Hosted,
            default_role: Role::LOWEST,
            sign_in_route: "/auth/signin".to_string(),
            local_admin: None,
            idle_timeout: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    pub fn from_vars<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match non_empty(lookup, "AUTH_BACKEND").as_deref() {
            None | Some("hosted") => AuthBackendKind::Hosted,
            Some("local") => AuthBackendKind::Local,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "AUTH_BACKEND",
                    reason: format!("expected 'hosted' or 'local', got '{}'", other),
                });
            }
        };

        let default_role = match non_empty(lookup, "DEFAULT_ROLE") {
            Some(raw) => raw.parse::<Role>().map_err(|e| ConfigError::Invalid {
                name: "DEFAULT_ROLE",
                reason: e.to_string(),
            })?,
            None => defaults.default_role,
        };

        let local_admin = match (
            non_empty(lookup, "LOCAL_ADMIN_EMAIL"),
            non_empty(lookup, "LOCAL_ADMIN_PASSWORD_HASH"),
        ) {
            (Some(email), Some(password_hash)) => Some(LocalAdminSeed {
                email,
                password_hash,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("LOCAL_ADMIN_PASSWORD_HASH")),
            (None, Some(_)) => return Err(ConfigError::Missing("LOCAL_ADMIN_EMAIL")),
        };

        let idle_timeout = positive_seconds(lookup, "SESSION_IDLE_TIMEOUT", 3600)?;
        let sweep_interval = positive_seconds(lookup, "SESSION_SWEEP_INTERVAL", 60)?;

        Ok(Self {
            backend,
            default_role,
            sign_in_route: non_empty(lookup, "SIGN_IN_ROUTE").unwrap_or(defaults.sign_in_route),
            local_admin,
            idle_timeout: Duration::from_secs(idle_timeout.unsigned_abs()),
            sweep_interval: Duration::from_secs(sweep_interval.unsigned_abs()),
        })
    }
}

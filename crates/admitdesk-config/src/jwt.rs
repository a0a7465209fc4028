use crate::{ConfigError, non_empty, positive_seconds};

/// Token settings for the local auth backend.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds, always positive.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds, always positive.
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            secret: non_empty(lookup, "JWT_SECRET")
                .unwrap_or_else(|| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: positive_seconds(lookup, "JWT_ACCESS_EXPIRY", 3600)?, // 1 hour
            refresh_token_expiry: positive_seconds(lookup, "JWT_REFRESH_EXPIRY", 604800)?, // 7 days
        })
    }
}

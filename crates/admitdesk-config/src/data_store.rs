//! Hosted data-store connection settings.
//!
//! # Environment Variables
//!
//! - `DATA_STORE_URL`: base URL of the hosted store, e.g. `https://xyz.example.co` (required)
//! - `DATA_STORE_ANON_KEY`: public (anonymous) API key sent with every request (required)
//!
//! Both are required. Their absence stops the process at startup.

use crate::{ConfigError, non_empty};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataStoreConfig {
    /// Base URL without a trailing slash.
    pub url: String,
    pub anon_key: String,
}

impl DataStoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_empty(lookup, "DATA_STORE_URL").ok_or(ConfigError::Missing("DATA_STORE_URL"))?;
        let anon_key = non_empty(lookup, "DATA_STORE_ANON_KEY")
            .ok_or(ConfigError::Missing("DATA_STORE_ANON_KEY"))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "DATA_STORE_URL",
                reason: format!("expected an http(s) URL, got '{}'", url),
            });
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    /// Joins `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }
}

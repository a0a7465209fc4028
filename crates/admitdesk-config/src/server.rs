use crate::non_empty;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    /// Directory for the rolling JSON log files.
    pub log_dir: String,
}

impl ServerConfig {
    pub fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            addr: non_empty(lookup, "SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            log_dir: non_empty(lookup, "LOG_DIR").unwrap_or_else(|| "storage/logs".to_string()),
        }
    }
}

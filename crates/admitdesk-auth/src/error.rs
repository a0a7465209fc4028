use thiserror::Error;

/// Failures reported by an auth backend or the session client.
///
/// These are surfaced to the session context as text and never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("no active session")]
    NoSession,

    #[error("auth provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth provider unreachable: {0}")]
    Transport(String),

    #[error("unexpected auth provider response: {0}")]
    Decode(String),

    #[error("token error: {0}")]
    Token(String),

    #[error("password hashing failed: {0}")]
    Password(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

impl From<bcrypt::BcryptError> for ProviderError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ProviderError::Password(err.to_string())
    }
}

/// Failures while loading a user's profile from the data store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile lookup rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("data store unreachable: {0}")]
    Transport(String),

    #[error("unexpected profile payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProfileError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProfileError::Decode(err.to_string())
        } else {
            ProfileError::Transport(err.to_string())
        }
    }
}

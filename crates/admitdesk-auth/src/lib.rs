//! # Admitdesk Auth
//!
//! Authentication and per-session state for the admissions dashboard.
//!
//! - [`backend`]: stateless auth backends (hosted HTTP API, in-process)
//! - [`client`]: a per-session client that stores tokens and broadcasts events
//! - [`context`]: the session state machine with resolved role permissions
//! - [`profile`]: where a user's role is read from
//! - [`password`]: bcrypt helpers for local accounts
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use admitdesk_auth::{AuthContext, ContextOptions, SessionClient};
//!
//! let client = Arc::new(SessionClient::new(backend));
//! let context = AuthContext::start(client, profiles, ContextOptions::default());
//!
//! context.login("officer@example.com", "password").await?;
//! let snapshot = context.wait_for_settled().await;
//! ```

pub mod backend;
pub mod client;
pub mod context;
pub mod error;
pub mod password;
pub mod profile;
pub mod session;

// Re-export commonly used types at crate root
pub use backend::{AuthBackend, HostedAuthBackend, LocalAccount, LocalAuthBackend};
pub use client::SessionClient;
pub use context::{AuthContext, AuthStatus, ContextOptions, SessionSnapshot, SessionUser};
pub use error::{ProfileError, ProviderError};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use profile::{HostedProfileStore, InMemoryProfileStore, ProfileStore, UserProfile};
pub use session::{AuthEvent, AuthEventKind, AuthSession, ProviderUser};

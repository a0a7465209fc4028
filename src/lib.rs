//! # Admitdesk API
//!
//! Session and permission service behind the university-admissions
//! dashboard. Staff sign in through an auth provider; each signed-in
//! dashboard session gets its own [`admitdesk_auth::AuthContext`], which
//! resolves the user's role and caches that role's permission table.
//!
//! ## Roles
//!
//! | Role | Rank | Typical reach |
//! |------|------|---------------|
//! | sales | 0 | students, applications, documents, messages, support |
//! | manager | 1 | adds staff view, analytics, settings view, deletes on pipeline data |
//! | chief | 2 | full pipeline control, staff management, permissions view |
//! | admin | 3 | everything |
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── admitdesk-rbac/     # roles, features, permission tables, hierarchy gate
//! ├── admitdesk-config/   # environment configuration
//! ├── admitdesk-auth/     # auth backends, session client, session context
//! └── admitdesk-cli/      # table inspection and password hashing
//! src/
//! ├── middleware/         # session and permission extractors
//! ├── modules/
//! │   ├── auth/           # login, logout, session, refresh
//! │   └── permissions/    # permission lookups and checks
//! ├── sessions.rs         # live contexts keyed by session id
//! └── utils/              # AppError
//! ```
//!
//! Each feature module follows the same layout: `model.rs` for DTOs,
//! `service.rs` for logic, `controller.rs` for handlers and `router.rs`.
//!
//! ## Quick Start
//!
//! ```bash
//! DATA_STORE_URL=https://project.example.co
//! DATA_STORE_ANON_KEY=public-anon-key
//! AUTH_BACKEND=hosted
//! ```
//!
//! API documentation is served at `/swagger-ui` while the server runs.

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod sessions;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use admitdesk_auth;
pub use admitdesk_config;
pub use admitdesk_rbac;

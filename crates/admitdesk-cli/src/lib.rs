//! # Admitdesk CLI
//!
//! Plain-text rendering of the permission tables and access decisions used by
//! the `admitdesk-cli` binary.
//!
//! ```ignore
//! use admitdesk_cli::report::render_role_table;
//! use admitdesk_rbac::Role;
//!
//! print!("{}", render_role_table(Role::Manager));
//! ```

pub mod report;

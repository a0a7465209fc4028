//! # Admitdesk RBAC
//!
//! Role-based access control for the Admitdesk admissions dashboard.
//!
//! This crate provides:
//!
//! - [`role`]: the four staff roles, their ordering, and boundary parsing
//! - [`feature`]: dashboard capability areas
//! - [`permission`]: per-feature view/edit/delete entries
//! - [`matrix`]: the static role/feature table and its lookups
//! - [`hierarchy`]: minimum-role gating with explicit overrides
//!
//! Nothing here performs I/O. All tables are `'static` and every lookup is
//! a pure function.

pub mod feature;
pub mod hierarchy;
pub mod matrix;
pub mod permission;
pub mod role;

// Re-export commonly used types at crate root
pub use feature::{Feature, UnknownFeature};
pub use hierarchy::{
    FEATURE_MIN_ROLE, HierarchyError, can_access, can_access_with, min_role_for,
    validate_min_role_table,
};
pub use matrix::{
    can_access_feature, get_permissions_by_role, has_permission, is_role_higher_than,
    role_permissions,
};
pub use permission::{Action, Permission, UnknownAction};
pub use role::{AssignedRole, ROLE_HIERARCHY, Role, UnknownRole};

//! The static role/feature permission table and its query functions.
//!
//! Every lookup is a pure function over `'static` data. Two defaults apply:
//!
//! - a feature with no entry in a role's table is denied;
//! - an unrecognized role is served the lowest role's table.
//!
//! # Example
//!
//! ```
//! use admitdesk_rbac::{Action, Feature, Role, can_access_feature, get_permissions_by_role, has_permission};
//!
//! assert!(!can_access_feature(&Role::Sales.into(), Feature::Staff));
//!
//! let admin = get_permissions_by_role(&Role::Admin.into());
//! assert!(has_permission(admin, Feature::Settings, Action::Delete));
//! ```

use tracing::warn;

use crate::feature::Feature;
use crate::permission::{Action, Permission};
use crate::role::{AssignedRole, Role};

const fn entry(feature: Feature, view: bool, edit: bool, delete: bool) -> Permission {
    Permission::new(feature, view, edit, delete)
}

// =============================================================================
// Role tables
// =============================================================================

const SALES_PERMISSIONS: &[Permission] = &[
    entry(Feature::Students, true, true, false),
    entry(Feature::Staff, false, false, false),
    entry(Feature::Universities, true, false, false),
    entry(Feature::Applications, true, true, false),
    entry(Feature::Documents, true, true, false),
    entry(Feature::Messages, true, true, false),
    entry(Feature::Support, true, true, false),
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    entry(Feature::Students, true, true, false),
    entry(Feature::Staff, true, false, false),
    entry(Feature::Universities, true, false, false),
    entry(Feature::Applications, true, true, true),
    entry(Feature::Documents, true, true, true),
    entry(Feature::Messages, true, true, true),
    entry(Feature::Support, true, true, false),
    entry(Feature::Analytics, true, false, false),
    entry(Feature::Settings, true, false, false),
];

const CHIEF_PERMISSIONS: &[Permission] = &[
    entry(Feature::Students, true, true, true),
    entry(Feature::Staff, true, true, true),
    entry(Feature::Universities, true, true, true),
    entry(Feature::Applications, true, true, true),
    entry(Feature::Documents, true, true, true),
    entry(Feature::Messages, true, true, true),
    entry(Feature::Support, true, true, true),
    entry(Feature::Analytics, true, false, false),
    entry(Feature::Permissions, true, false, false),
    entry(Feature::Settings, true, true, false),
];

const ADMIN_PERMISSIONS: &[Permission] = &[
    entry(Feature::Students, true, true, true),
    entry(Feature::Staff, true, true, true),
    entry(Feature::Universities, true, true, true),
    entry(Feature::Applications, true, true, true),
    entry(Feature::Documents, true, true, true),
    entry(Feature::Messages, true, true, true),
    entry(Feature::Support, true, true, true),
    entry(Feature::Analytics, true, true, true),
    entry(Feature::Permissions, true, true, true),
    entry(Feature::Settings, true, true, true),
];

/// The literal table for a known role.
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Sales => SALES_PERMISSIONS,
        Role::Manager => MANAGER_PERMISSIONS,
        Role::Chief => CHIEF_PERMISSIONS,
        Role::Admin => ADMIN_PERMISSIONS,
    }
}

/// Permissions for an assigned role. Unrecognized roles get the lowest
/// role's table.
pub fn get_permissions_by_role(role: &AssignedRole) -> &'static [Permission] {
    match role {
        AssignedRole::Known(role) => role_permissions(*role),
        AssignedRole::Unrecognized(raw) => {
            warn!(role = %raw, fallback = %Role::LOWEST, "Unrecognized role, using lowest role permissions");
            role_permissions(Role::LOWEST)
        }
    }
}

/// Looks up `feature` in `permissions` and returns its flag for `action`.
/// No entry means no access.
pub fn has_permission(permissions: &[Permission], feature: Feature, action: Action) -> bool {
    permissions
        .iter()
        .find(|permission| permission.feature == feature)
        .is_some_and(|permission| permission.allows(action))
}

pub fn can_access_feature(role: &AssignedRole, feature: Feature) -> bool {
    has_permission(get_permissions_by_role(role), feature, Action::View)
}

/// Strict rank comparison. A role outside the hierarchy ranks below every
/// role in it, so it is never higher than anything.
pub fn is_role_higher_than(role: &AssignedRole, other: &AssignedRole) -> bool {
    match (role.known(), other.known()) {
        (Some(role), Some(other)) => role.is_higher_than(other),
        // Unrecognized roles rank below every known role.
        (Some(_), None) => true,
        (None, _) => false,
    }
}

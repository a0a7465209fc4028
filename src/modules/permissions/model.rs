use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use admitdesk_rbac::{Action, Feature, Permission, Role};

/// `?feature=&action=`. Actions may be given as `can_edit` or `edit`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckQuery {
    #[param(example = "students")]
    pub feature: String,
    #[param(example = "can_view")]
    pub action: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResponse {
    pub feature: Feature,
    pub action: Action,
    pub allowed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RolePermissionsResponse {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatrixResponse {
    /// One entry per role, lowest first.
    pub roles: Vec<RolePermissionsResponse>,
}

/// `?role=&feature=&action=`. Unrecognized role names are accepted and
/// always denied.
#[derive(Debug, Deserialize, IntoParams)]
pub struct HierarchyQuery {
    #[param(example = "manager")]
    pub role: String,
    #[param(example = "analytics")]
    pub feature: String,
    #[param(example = "can_view")]
    pub action: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HierarchyResponse {
    pub role: String,
    pub feature: Feature,
    pub action: Action,
    pub min_role: Option<Role>,
    /// Decision from the minimum-role table alone.
    pub rank_allowed: bool,
    /// Decision with the role's own table entries as overrides.
    pub allowed: bool,
}

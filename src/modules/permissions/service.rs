use anyhow::anyhow;
use tracing::debug;

use admitdesk_rbac::{
    Action, AssignedRole, Feature, ROLE_HIERARCHY, Role, can_access, get_permissions_by_role,
    min_role_for, role_permissions,
};

use crate::middleware::auth::CurrentSession;
use crate::utils::errors::AppError;

use super::model::{
    CheckResponse, HierarchyQuery, HierarchyResponse, MatrixResponse, RolePermissionsResponse,
};

fn parse_feature(raw: &str) -> Result<Feature, AppError> {
    raw.parse().map_err(AppError::bad_request)
}

fn parse_action(raw: &str) -> Result<Action, AppError> {
    raw.parse().map_err(AppError::bad_request)
}

pub struct PermissionService;

impl PermissionService {
    pub fn check(
        session: &CurrentSession,
        feature: &str,
        action: &str,
    ) -> Result<CheckResponse, AppError> {
        let feature = parse_feature(feature)?;
        let action = parse_action(action)?;
        let allowed = session.has_permission(feature, action);
        debug!(session_id = %session.id, %feature, %action, allowed, "Permission check");

        Ok(CheckResponse {
            feature,
            action,
            allowed,
        })
    }

    pub fn for_role(role: &str) -> Result<RolePermissionsResponse, AppError> {
        let role: Role = role
            .parse()
            .map_err(|_| AppError::not_found(anyhow!("Role '{}' not found", role)))?;

        Ok(RolePermissionsResponse {
            role,
            permissions: role_permissions(role).to_vec(),
        })
    }

    pub fn matrix() -> MatrixResponse {
        MatrixResponse {
            roles: ROLE_HIERARCHY
                .iter()
                .map(|&role| RolePermissionsResponse {
                    role,
                    permissions: role_permissions(role).to_vec(),
                })
                .collect(),
        }
    }

    pub fn hierarchy(query: &HierarchyQuery) -> Result<HierarchyResponse, AppError> {
        let role = AssignedRole::parse(query.role.trim());
        let feature = parse_feature(&query.feature)?;
        let action = parse_action(&query.action)?;

        Ok(HierarchyResponse {
            role: role.to_string(),
            feature,
            action,
            min_role: min_role_for(feature),
            rank_allowed: can_access(&role, &[], feature, action),
            allowed: can_access(&role, get_permissions_by_role(&role), feature, action),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn query(role: &str, feature: &str, action: &str) -> HierarchyQuery {
        HierarchyQuery {
            role: role.to_string(),
            feature: feature.to_string(),
            action: action.to_string(),
        }
    }

    #[test]
    fn test_matrix_lists_roles_lowest_first() {
        let matrix = PermissionService::matrix();
        let roles: Vec<Role> = matrix.roles.iter().map(|r| r.role).collect();
        assert_eq!(roles, ROLE_HIERARCHY.to_vec());
        assert_eq!(matrix.roles[3].permissions.len(), Feature::ALL.len());
    }

    #[test]
    fn test_for_role_unknown_is_not_found() {
        let err = PermissionService::for_role("owner").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(PermissionService::for_role("Chief").is_ok());
    }

    #[test]
    fn test_hierarchy_rank_versus_overrides() {
        // Manager meets the analytics minimum but its entry forbids edits.
        let response = PermissionService::hierarchy(&query("manager", "analytics", "can_edit")).unwrap();
        assert_eq!(response.min_role, Some(Role::Manager));
        assert!(response.rank_allowed);
        assert!(!response.allowed);
    }

    #[test]
    fn test_hierarchy_unrecognized_role_is_denied() {
        let response = PermissionService::hierarchy(&query("intern", "students", "view")).unwrap();
        assert_eq!(response.role, "intern");
        assert!(!response.rank_allowed);
        assert!(!response.allowed);
    }

    #[test]
    fn test_hierarchy_rejects_unknown_feature() {
        let err = PermissionService::hierarchy(&query("admin", "payroll", "view")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}

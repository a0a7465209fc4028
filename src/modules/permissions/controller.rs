use axum::Json;
use axum::extract::{Path, Query};
use tracing::instrument;

use admitdesk_rbac::Permission;

use crate::middleware::auth::{CurrentSession, RequirePermissionsView};
use crate::modules::auth::controller::ErrorResponse;
use crate::utils::errors::AppError;

use super::model::{
    CheckQuery, CheckResponse, HierarchyQuery, HierarchyResponse, MatrixResponse,
    RolePermissionsResponse,
};
use super::service::PermissionService;

/// Permissions cached for the current session
#[utoipa::path(
    get,
    path = "/api/permissions/me",
    responses(
        (status = 200, description = "Permission list resolved at sign-in", body = Vec<Permission>),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn my_permissions(session: CurrentSession) -> Json<Vec<Permission>> {
    Json(session.context.permissions())
}

/// Check one action on one feature for the current session
#[utoipa::path(
    get,
    path = "/api/permissions/check",
    params(CheckQuery),
    responses(
        (status = 200, description = "Decision", body = CheckResponse),
        (status = 400, description = "Unknown feature or action", body = ErrorResponse),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn check_permission(
    session: CurrentSession,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    let response = PermissionService::check(&session, &query.feature, &query.action)?;
    Ok(Json(response))
}

/// Permission table for a role
#[utoipa::path(
    get,
    path = "/api/permissions/roles/{role}",
    params(("role" = String, Path, description = "sales, manager, chief or admin")),
    responses(
        (status = 200, description = "The role's table", body = RolePermissionsResponse),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse),
        (status = 403, description = "Session may not view permissions", body = ErrorResponse),
        (status = 404, description = "Unknown role", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip_all, fields(role = %role))]
pub async fn role_permissions(
    _gate: RequirePermissionsView,
    Path(role): Path<String>,
) -> Result<Json<RolePermissionsResponse>, AppError> {
    Ok(Json(PermissionService::for_role(&role)?))
}

/// Every role's permission table
#[utoipa::path(
    get,
    path = "/api/permissions/matrix",
    responses(
        (status = 200, description = "All role tables, lowest role first", body = MatrixResponse),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse),
        (status = 403, description = "Session may not view permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip_all)]
pub async fn permission_matrix(_gate: RequirePermissionsView) -> Json<MatrixResponse> {
    Json(PermissionService::matrix())
}

/// Minimum-role decision for a role, feature and action
#[utoipa::path(
    get,
    path = "/api/permissions/hierarchy",
    params(HierarchyQuery),
    responses(
        (status = 200, description = "Decision", body = HierarchyResponse),
        (status = 400, description = "Unknown feature or action", body = ErrorResponse),
        (status = 401, description = "Missing or unknown session", body = ErrorResponse),
        (status = 403, description = "Session may not view permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip_all)]
pub async fn hierarchy_check(
    _gate: RequirePermissionsView,
    Query(query): Query<HierarchyQuery>,
) -> Result<Json<HierarchyResponse>, AppError> {
    Ok(Json(PermissionService::hierarchy(&query)?))
}

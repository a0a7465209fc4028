use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use admitdesk_auth::{AuthStatus, SessionSnapshot, SessionUser};
use admitdesk_rbac::{Action, Feature, Permission, Role};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, LogoutResponse};
use crate::modules::permissions::model::{
    CheckResponse, HierarchyResponse, MatrixResponse, RolePermissionsResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::get_session,
        crate::modules::auth::controller::refresh,
        crate::modules::permissions::controller::my_permissions,
        crate::modules::permissions::controller::check_permission,
        crate::modules::permissions::controller::role_permissions,
        crate::modules::permissions::controller::permission_matrix,
        crate::modules::permissions::controller::hierarchy_check,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            LogoutResponse,
            SessionSnapshot,
            SessionUser,
            AuthStatus,
            Role,
            Feature,
            Action,
            Permission,
            CheckResponse,
            RolePermissionsResponse,
            MatrixResponse,
            HierarchyResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Dashboard sign-in and session lifecycle"),
        (name = "Permissions", description = "Role permission tables and checks")
    ),
    info(
        title = "Admitdesk API",
        version = "0.1.0",
        description = "Session and role-based access control service for the admissions dashboard.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("session id")
                        .build(),
                ),
            )
        }
    }
}

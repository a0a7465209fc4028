use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    check_permission, hierarchy_check, my_permissions, permission_matrix, role_permissions,
};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(my_permissions))
        .route("/check", get(check_permission))
        .route("/roles/{role}", get(role_permissions))
        .route("/matrix", get(permission_matrix))
        .route("/hierarchy", get(hierarchy_check))
}

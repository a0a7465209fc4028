use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_session, login, logout, refresh};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(get_session))
        .route("/refresh", post(refresh))
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use admitdesk_auth::{AuthStatus, SessionSnapshot, SessionUser};
use admitdesk_rbac::Permission;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    #[schema(example = "officer@example.com")]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// A freshly created dashboard session. `session_id` is the bearer value
/// for every later request.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub status: AuthStatus,
    pub user: Option<SessionUser>,
    pub permissions: Vec<Permission>,
}

impl LoginResponse {
    pub fn new(session_id: Uuid, snapshot: SessionSnapshot) -> Self {
        Self {
            session_id,
            status: snapshot.status,
            user: snapshot.user,
            permissions: snapshot.permissions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    /// Where the client should navigate next.
    #[schema(example = "/auth/signin")]
    pub redirect_to: String,
}

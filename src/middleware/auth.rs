use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use admitdesk_auth::AuthContext;
use admitdesk_rbac::{Action, Feature};

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Extractor resolving `Authorization: Bearer <session id>` to a live
/// [`AuthContext`].
#[derive(Clone)]
pub struct CurrentSession {
    pub id: Uuid,
    pub context: Arc<AuthContext>,
}

impl CurrentSession {
    pub fn has_permission(&self, feature: Feature, action: Action) -> bool {
        self.context.has_permission(feature, action)
    }

    /// `Ok(())` when the session's cached permissions allow `action` on
    /// `feature`, otherwise a 403.
    pub fn require(&self, feature: Feature, action: Action) -> Result<(), AppError> {
        if self.has_permission(feature, action) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Access denied. Missing permission: {} on {}",
                action, feature
            )))
        }
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized("Missing or invalid authorization header"))?;

        let id = Uuid::parse_str(bearer.token())
            .map_err(|_| AppError::unauthorized("Invalid session id"))?;

        let context = state
            .sessions
            .get(id)
            .await
            .ok_or_else(|| AppError::unauthorized("Session not found or expired"))?;

        Ok(CurrentSession { id, context })
    }
}

/// Declares an extractor that admits a session only if its cached
/// permissions grant `$action` on `$feature`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $feature:expr, $action:expr) => {
        #[derive(Clone)]
        pub struct $name(pub $crate::middleware::auth::CurrentSession);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::utils::errors::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let session = <$crate::middleware::auth::CurrentSession as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                session.require($feature, $action)?;
                Ok($name(session))
            }
        }
    };
}

require_permission!(RequirePermissionsView, Feature::Permissions, Action::View);

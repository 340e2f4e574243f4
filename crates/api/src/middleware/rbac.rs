//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the route's minimum requirement. These are coarse route-level
//! gates; object-level decisions (ownership) go through
//! [`aegs_core::policy::decide`] in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use aegs_core::error::CoreError;
use aegs_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `organizer` or `admin` role. Rejects with 403 Forbidden
/// otherwise.
///
/// ```ignore
/// async fn manager_only(RequireManager(user): RequireManager) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_manager() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Organizer or Admin role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}

/// Requires a participant role (`student` or `professor`). Rejects with
/// 403 Forbidden otherwise. Used for self-service enrollment, which
/// managers perform through the managed-enrollment route instead.
pub struct RequireParticipant(pub AuthUser);

impl FromRequestParts<AppState> for RequireParticipant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_participant() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Student or Professor role required".into(),
            )));
        }
        Ok(RequireParticipant(user))
    }
}

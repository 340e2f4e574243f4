//! Handler for the `/audit` listing.

use axum::extract::State;
use axum::Json;

use aegs_core::roles::Role;
use aegs_db::models::audit::AuditLog;
use aegs_db::repositories::AuditRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireManager;
use crate::state::AppState;

/// Number of entries returned by the audit listing.
const AUDIT_PAGE_SIZE: i64 = 50;

/// GET /api/v1/audit
///
/// List recent audit entries. Admins see everything; organizers see their
/// own actions and entries about events they organize.
pub async fn list_audit(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
) -> AppResult<Json<Vec<AuditLog>>> {
    let entries = match user.role {
        Role::Admin => AuditRepo::list_recent(&state.pool, AUDIT_PAGE_SIZE).await?,
        _ => {
            AuditRepo::list_recent_for_organizer(&state.pool, user.user_id, AUDIT_PAGE_SIZE)
                .await?
        }
    };
    Ok(Json(entries))
}

//! Handler for the `/participants` listing used by managers when
//! enrolling people into events.

use axum::extract::State;
use axum::Json;

use aegs_db::models::user::UserSummary;
use aegs_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireManager;
use crate::state::AppState;

/// GET /api/v1/participants
///
/// List all participant accounts (students and professors), ordered by
/// display name.
pub async fn list_participants(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
) -> AppResult<Json<Vec<UserSummary>>> {
    let participants = UserRepo::list_participants(&state.pool).await?;
    Ok(Json(participants))
}

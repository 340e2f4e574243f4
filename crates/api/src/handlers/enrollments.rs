//! Handlers for the `/enrollments` resource: self-service enrollment, the
//! caller's own enrollments, and manager-driven status/attendance
//! transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use aegs_core::error::CoreError;
use aegs_core::policy::{decide, Action};
use aegs_core::types::DbId;
use aegs_db::models::enrollment::{CreateEnrollment, EnrollmentDetail, EnrollmentWithEvent};
use aegs_db::models::status::EnrollmentStatus;
use aegs_db::repositories::EnrollmentRepo;

use crate::audit::{self, actions};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireManager, RequireParticipant};
use crate::state::AppState;

use super::events::{find_enrollment_detail, map_enroll_error};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /enrollments` (self-service).
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub event_id: DbId,
}

/// Request body for `PUT /enrollments/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target status name: `confirmed` or `canceled`.
    pub status: String,
}

/// Request body for `PUT /enrollments/{id}/attendance`.
#[derive(Debug, Deserialize)]
pub struct SetAttendanceRequest {
    pub attended: bool,
}

/// Response for a status or attendance mutation.
#[derive(Debug, Serialize)]
pub struct EnrollmentStateResponse {
    pub id: DbId,
    pub event_id: DbId,
    pub participant_id: DbId,
    pub status: String,
    pub attendance_confirmed: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/enrollments
///
/// Enroll the calling participant into an event. Status starts as pending
/// with attendance unconfirmed. 201 Created; 409 if already enrolled; 400
/// if the event is full.
pub async fn enroll(
    State(state): State<AppState>,
    RequireParticipant(user): RequireParticipant,
    Json(input): Json<EnrollRequest>,
) -> AppResult<(StatusCode, Json<EnrollmentDetail>)> {
    let enrollment = EnrollmentRepo::create(
        &state.pool,
        &CreateEnrollment {
            event_id: input.event_id,
            participant_id: user.user_id,
        },
    )
    .await
    .map_err(map_enroll_error)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::ENROLLMENT_CREATED,
        "enrollment",
        enrollment.id,
        Some(serde_json::json!({ "event_id": input.event_id })),
    )
    .await;

    let detail = find_enrollment_detail(&state, enrollment.id, input.event_id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/enrollments/mine
///
/// List the caller's enrollments with event context.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<EnrollmentDetail>>> {
    let enrollments = EnrollmentRepo::list_by_participant(&state.pool, user.user_id).await?;
    Ok(Json(enrollments))
}

/// PUT /api/v1/enrollments/{id}/status
///
/// Transition an enrollment's status. Valid transitions: pending to
/// confirmed or canceled, confirmed to canceled. Leaving confirmed clears
/// the attendance flag in the same statement.
pub async fn set_status(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<EnrollmentStateResponse>> {
    let enrollment = load_managed_enrollment(&state, &user, id).await?;

    let target = EnrollmentStatus::from_name(&input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown enrollment status: {}",
            input.status
        )))
    })?;

    let current = enrollment.status();
    if !current.can_transition_to(target) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Cannot transition enrollment from {} to {}",
            current.name(),
            target.name()
        ))));
    }

    let updated = EnrollmentRepo::set_status(&state.pool, id, target)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::ENROLLMENT_UPDATED,
        "enrollment",
        id,
        Some(serde_json::json!({ "status": target.name() })),
    )
    .await;

    Ok(Json(state_response(&updated)))
}

/// PUT /api/v1/enrollments/{id}/attendance
///
/// Set the attendance flag. Marking attendance requires the enrollment to
/// be confirmed.
pub async fn set_attendance(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<SetAttendanceRequest>,
) -> AppResult<Json<EnrollmentStateResponse>> {
    let enrollment = load_managed_enrollment(&state, &user, id).await?;

    if input.attended && enrollment.status() != EnrollmentStatus::Confirmed {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Attendance can only be confirmed for confirmed enrollments (current status: {})",
            enrollment.status().name()
        ))));
    }

    let updated = EnrollmentRepo::set_attendance(&state.pool, id, input.attended)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::ENROLLMENT_UPDATED,
        "enrollment",
        id,
        Some(serde_json::json!({ "attendance_confirmed": input.attended })),
    )
    .await;

    Ok(Json(state_response(&updated)))
}

/// POST /api/v1/enrollments/{id}/cancel
///
/// Cancel an enrollment. Participants cancel their own; managers cancel
/// enrollments of events they manage. Canceling clears attendance.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<EnrollmentStateResponse>> {
    let enrollment = load_cancelable_enrollment(&state, &user, id).await?;

    let current = enrollment.status();
    if !current.can_transition_to(EnrollmentStatus::Canceled) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Cannot cancel an enrollment with status {}",
            current.name()
        ))));
    }

    let updated = EnrollmentRepo::set_status(&state.pool, id, EnrollmentStatus::Canceled)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::ENROLLMENT_UPDATED,
        "enrollment",
        id,
        Some(serde_json::json!({ "status": "canceled" })),
    )
    .await;

    Ok(Json(state_response(&updated)))
}

/// DELETE /api/v1/enrollments/{id}
///
/// Hard-delete an enrollment; its certificate, if any, cascades. Same
/// permission rules as cancellation. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_cancelable_enrollment(&state, &user, id).await?;
    EnrollmentRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an enrollment a manager may act on: admins any, organizers only
/// those of their own events.
async fn load_managed_enrollment(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<EnrollmentWithEvent> {
    let enrollment = EnrollmentRepo::find_with_event(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;

    let owns = enrollment.organizer_id == user.user_id;
    if !decide(user.role, Action::ManageEnrollment, owns).is_allowed() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not manage this enrollment".into(),
        )));
    }
    Ok(enrollment)
}

/// Load an enrollment the caller may cancel or delete: the participant
/// themselves, the owning organizer, or an admin.
async fn load_cancelable_enrollment(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<EnrollmentWithEvent> {
    let enrollment = EnrollmentRepo::find_with_event(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;

    if enrollment.participant_id == user.user_id {
        return Ok(enrollment);
    }

    let owns = enrollment.organizer_id == user.user_id;
    if !decide(user.role, Action::ManageEnrollment, owns).is_allowed() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have permission to cancel this enrollment".into(),
        )));
    }
    Ok(enrollment)
}

fn state_response(enrollment: &aegs_db::models::enrollment::Enrollment) -> EnrollmentStateResponse {
    EnrollmentStateResponse {
        id: enrollment.id,
        event_id: enrollment.event_id,
        participant_id: enrollment.participant_id,
        status: enrollment.status().name().to_string(),
        attendance_confirmed: enrollment.attendance_confirmed,
    }
}

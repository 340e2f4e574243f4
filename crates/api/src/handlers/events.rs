//! Handlers for the `/events` resource, including per-event enrollment
//! listing and managed enrollment creation.
//!
//! Visibility follows the original business rules: participants and
//! admins see every event, organizers see only their own.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use aegs_core::error::CoreError;
use aegs_core::policy::{decide, Action};
use aegs_core::roles::Role;
use aegs_core::types::{Date, DbId};
use aegs_db::models::enrollment::{CreateEnrollment, EnrollmentDetail};
use aegs_db::models::event::{CreateEvent, Event, EventResponse, UpdateEvent};
use aegs_db::models::status::EventType;
use aegs_db::repositories::{EnrollmentRepo, EventRepo, RoleRepo, UserRepo};

use crate::audit::{self, actions};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Seeded type name: `lecture`, `workshop`, `short_course`, `seminar`,
    /// or `other`.
    pub event_type: String,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub location: String,
    pub starts_on: Date,
    pub ends_on: Date,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(range(min = 1))]
    pub workload_hours: i32,
    /// Organizer override; admins only. Defaults to the caller.
    pub organizer_id: Option<DbId>,
}

/// Request body for `PUT /events/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub event_type: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub starts_on: Option<Date>,
    pub ends_on: Option<Date>,
    pub capacity: Option<i32>,
    pub workload_hours: Option<i32>,
}

/// Request body for `POST /events/{id}/enrollments` (managed enrollment).
#[derive(Debug, Deserialize)]
pub struct ManagedEnrollmentRequest {
    pub participant_id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/events
///
/// List events with the organizer embedded. Organizers see only events
/// they organize; everyone else sees all events.
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<EventResponse>>> {
    let rows = match user.role {
        Role::Organizer => EventRepo::list_by_organizer(&state.pool, user.user_id).await?,
        _ => EventRepo::list_with_organizer(&state.pool).await?,
    };
    Ok(Json(rows.into_iter().map(EventResponse::from).collect()))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<EventResponse>> {
    let row = EventRepo::find_with_organizer(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    if user.role == Role::Organizer && row.organizer_id != user.user_id {
        return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
    }

    Ok(Json(EventResponse::from(row)))
}

/// POST /api/v1/events
///
/// Create a new event. Organizers create events for themselves; admins may
/// name another organizer. 201 Created.
pub async fn create_event(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    input.validate()?;
    validate_date_range(input.starts_on, input.ends_on)?;
    let event_type = parse_event_type(&input.event_type)?;

    let organizer_id = match input.organizer_id {
        Some(id) if id != user.user_id => {
            // Naming someone else is an admin capability.
            if user.role != Role::Admin {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only admins may create events for another organizer".into(),
                )));
            }
            ensure_manager_account(&state, id).await?;
            id
        }
        _ => user.user_id,
    };

    let create_dto = CreateEvent {
        event_type_id: event_type.id(),
        title: input.title,
        location: input.location,
        starts_on: input.starts_on,
        ends_on: input.ends_on,
        capacity: input.capacity,
        workload_hours: input.workload_hours,
        organizer_id,
    };
    let event = EventRepo::create(&state.pool, &create_dto).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::EVENT_CREATED,
        "event",
        event.id,
        Some(serde_json::json!({
            "event_type": event_type.name(),
            "location": event.location,
            "capacity": event.capacity,
        })),
    )
    .await;

    let row = EventRepo::find_with_organizer(&state.pool, event.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Created event vanished".into()))?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(row))))
}

/// PUT /api/v1/events/{id}
///
/// Partially update an event. Re-validates the date and capacity
/// invariants against the resulting row; `updated_at` refreshes as an
/// observable side effect of any successful mutation.
pub async fn update_event(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEventRequest>,
) -> AppResult<Json<EventResponse>> {
    let current = load_owned_event(&state, &user, id, Action::ManageEvent).await?;

    let starts_on = input.starts_on.unwrap_or(current.starts_on);
    let ends_on = input.ends_on.unwrap_or(current.ends_on);
    validate_date_range(starts_on, ends_on)?;

    if let Some(capacity) = input.capacity {
        if capacity <= 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Capacity must be positive".into(),
            )));
        }
    }
    if let Some(hours) = input.workload_hours {
        if hours <= 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Workload hours must be positive".into(),
            )));
        }
    }

    let event_type_id = match &input.event_type {
        Some(name) => Some(parse_event_type(name)?.id()),
        None => None,
    };

    let update_dto = UpdateEvent {
        event_type_id,
        title: input.title,
        location: input.location,
        starts_on: input.starts_on,
        ends_on: input.ends_on,
        capacity: input.capacity,
        workload_hours: input.workload_hours,
    };
    let updated = EventRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::EVENT_UPDATED,
        "event",
        updated.id,
        None,
    )
    .await;

    let row = EventRepo::find_with_organizer(&state.pool, updated.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Updated event vanished".into()))?;
    Ok(Json(EventResponse::from(row)))
}

/// DELETE /api/v1/events/{id}
///
/// Delete an event; its enrollments (and their certificates) cascade.
/// Returns 204 No Content.
pub async fn delete_event(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned_event(&state, &user, id, Action::ManageEvent).await?;

    EventRepo::delete(&state.pool, id).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::EVENT_DELETED,
        "event",
        id,
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/events/{id}/enrollments
///
/// List an event's enrollments. Organizers only for their own events.
pub async fn list_event_enrollments(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<EnrollmentDetail>>> {
    load_owned_event(&state, &user, id, Action::ManageEnrollment).await?;
    let enrollments = EnrollmentRepo::list_by_event(&state.pool, id).await?;
    Ok(Json(enrollments))
}

/// POST /api/v1/events/{id}/enrollments
///
/// Enroll a named participant (managed enrollment). The participant must
/// hold a participant role. 201 Created.
pub async fn create_managed_enrollment(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<ManagedEnrollmentRequest>,
) -> AppResult<(StatusCode, Json<EnrollmentDetail>)> {
    load_owned_event(&state, &user, id, Action::ManageEnrollment).await?;

    let participant = UserRepo::find_by_id(&state.pool, input.participant_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Reference(format!(
                "Participant {} does not exist",
                input.participant_id
            )))
        })?;
    let role_name = RoleRepo::resolve_name(&state.pool, participant.role_id).await?;
    let participant_role = Role::from_name(&role_name)
        .ok_or_else(|| AppError::InternalError(format!("Unknown seeded role: {role_name}")))?;
    if !participant_role.is_participant() {
        return Err(AppError::Core(CoreError::Validation(
            "Only students and professors can be enrolled in events".into(),
        )));
    }

    let enrollment = EnrollmentRepo::create(
        &state.pool,
        &CreateEnrollment {
            event_id: id,
            participant_id: participant.id,
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
        Some(serde_json::json!({ "event_id": id, "participant_id": participant.id })),
    )
    .await;

    let detail = find_enrollment_detail(&state, enrollment.id, id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an event and verify the caller may act on it under `action`.
///
/// Organizers that do not own the event get a 404 rather than a 403, so
/// the existence of other organizers' events is not leaked.
pub async fn load_owned_event(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    action: Action,
) -> AppResult<Event> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    let owns = event.organizer_id == user.user_id;
    if !decide(user.role, action, owns).is_allowed() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
    }
    Ok(event)
}

/// Map a repository enrollment error, wrapping the duplicate-pair unique
/// violation into a friendlier conflict message.
pub fn map_enroll_error(err: aegs_db::repositories::EnrollError) -> AppError {
    use aegs_db::repositories::EnrollError;
    match &err {
        EnrollError::Database(sqlx::Error::Database(db_err))
            if db_err.constraint() == Some("uq_enrollments_event_participant") =>
        {
            AppError::Core(CoreError::Conflict(
                "Participant is already enrolled in this event".into(),
            ))
        }
        _ => err.into(),
    }
}

/// Fetch the detail row for a just-created enrollment.
pub async fn find_enrollment_detail(
    state: &AppState,
    enrollment_id: DbId,
    event_id: DbId,
) -> AppResult<EnrollmentDetail> {
    EnrollmentRepo::list_by_event(&state.pool, event_id)
        .await?
        .into_iter()
        .find(|e| e.id == enrollment_id)
        .ok_or_else(|| AppError::InternalError("Created enrollment vanished".into()))
}

fn parse_event_type(name: &str) -> Result<EventType, AppError> {
    EventType::from_name(name).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Unknown event type: {name}")))
    })
}

fn validate_date_range(starts_on: Date, ends_on: Date) -> Result<(), AppError> {
    if ends_on < starts_on {
        return Err(AppError::Core(CoreError::Validation(
            "End date cannot be before start date".into(),
        )));
    }
    Ok(())
}

/// Ensure the given user exists and holds a manager role (for admin
/// creating events on behalf of an organizer).
async fn ensure_manager_account(state: &AppState, id: DbId) -> AppResult<()> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Reference(format!("Organizer {id} does not exist")))
        })?;
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let role = Role::from_name(&role_name)
        .ok_or_else(|| AppError::InternalError(format!("Unknown seeded role: {role_name}")))?;
    if !role.is_manager() {
        return Err(AppError::Core(CoreError::Validation(
            "Event organizer must hold the organizer or admin role".into(),
        )));
    }
    Ok(())
}

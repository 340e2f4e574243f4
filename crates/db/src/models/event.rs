//! Event entity model and DTOs.

use aegs_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserSummary;

/// Full event row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type_id: i16,
    pub title: Option<String>,
    pub location: String,
    pub starts_on: Date,
    pub ends_on: Date,
    pub capacity: i32,
    pub workload_hours: i32,
    pub organizer_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Event row joined with its organizer and type name, as returned by
/// listing queries.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithOrganizer {
    pub id: DbId,
    pub event_type_id: i16,
    pub event_type: String,
    pub title: Option<String>,
    pub location: String,
    pub starts_on: Date,
    pub ends_on: Date,
    pub capacity: i32,
    pub workload_hours: i32,
    pub organizer_id: DbId,
    pub organizer_username: String,
    pub organizer_display_name: String,
    pub organizer_email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// API-facing event representation with the organizer embedded.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: DbId,
    pub event_type: String,
    pub title: Option<String>,
    pub location: String,
    pub starts_on: Date,
    pub ends_on: Date,
    pub capacity: i32,
    pub workload_hours: i32,
    pub organizer: UserSummary,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<EventWithOrganizer> for EventResponse {
    fn from(row: EventWithOrganizer) -> Self {
        EventResponse {
            id: row.id,
            event_type: row.event_type,
            title: row.title,
            location: row.location,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
            capacity: row.capacity,
            workload_hours: row.workload_hours,
            organizer: UserSummary {
                id: row.organizer_id,
                username: row.organizer_username,
                display_name: row.organizer_display_name,
                email: row.organizer_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a new event.
#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub event_type_id: i16,
    pub title: Option<String>,
    pub location: String,
    pub starts_on: Date,
    pub ends_on: Date,
    pub capacity: i32,
    pub workload_hours: i32,
    pub organizer_id: DbId,
}

/// DTO for updating an existing event. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub event_type_id: Option<i16>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub starts_on: Option<Date>,
    pub ends_on: Option<Date>,
    pub capacity: Option<i32>,
    pub workload_hours: Option<i32>,
}

//! Repository for the `events` table.

use aegs_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, EventWithOrganizer, UpdateEvent};

const COLUMNS: &str = "id, event_type_id, title, location, starts_on, ends_on, capacity, \
                        workload_hours, organizer_id, created_at, updated_at";

/// Join used by every listing query: event + type name + organizer summary.
const JOINED_COLUMNS: &str = "e.id, e.event_type_id, t.name AS event_type, e.title, e.location, \
                               e.starts_on, e.ends_on, e.capacity, e.workload_hours, \
                               e.organizer_id, u.username AS organizer_username, \
                               u.display_name AS organizer_display_name, \
                               u.email AS organizer_email, e.created_at, e.updated_at";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (event_type_id, title, location, starts_on, ends_on, capacity, workload_hours, organizer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(input.event_type_id)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(input.capacity)
            .bind(input.workload_hours)
            .bind(input.organizer_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an event with its organizer embedded.
    pub async fn find_with_organizer(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EventWithOrganizer>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM events e
             JOIN event_types t ON t.id = e.event_type_id
             JOIN users u ON u.id = e.organizer_id
             WHERE e.id = $1"
        );
        sqlx::query_as::<_, EventWithOrganizer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all events with organizer context, soonest first.
    pub async fn list_with_organizer(pool: &PgPool) -> Result<Vec<EventWithOrganizer>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM events e
             JOIN event_types t ON t.id = e.event_type_id
             JOIN users u ON u.id = e.organizer_id
             ORDER BY e.starts_on, e.id"
        );
        sqlx::query_as::<_, EventWithOrganizer>(&query)
            .fetch_all(pool)
            .await
    }

    /// List one organizer's events with organizer context, soonest first.
    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: DbId,
    ) -> Result<Vec<EventWithOrganizer>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM events e
             JOIN event_types t ON t.id = e.event_type_id
             JOIN users u ON u.id = e.organizer_id
             WHERE e.organizer_id = $1
             ORDER BY e.starts_on, e.id"
        );
        sqlx::query_as::<_, EventWithOrganizer>(&query)
            .bind(organizer_id)
            .fetch_all(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied;
    /// `updated_at` is refreshed as part of the same statement.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                event_type_id = COALESCE($2, event_type_id),
                title = COALESCE($3, title),
                location = COALESCE($4, location),
                starts_on = COALESCE($5, starts_on),
                ends_on = COALESCE($6, ends_on),
                capacity = COALESCE($7, capacity),
                workload_hours = COALESCE($8, workload_hours),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(input.event_type_id)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(input.capacity)
            .bind(input.workload_hours)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event. Enrollments (and their certificates) cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count enrollments that occupy a capacity slot (anything not canceled).
    pub async fn count_active_enrollments(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments
             WHERE event_id = $1 AND status_id <> $2",
        )
        .bind(id)
        .bind(crate::models::status::EnrollmentStatus::Canceled.id())
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

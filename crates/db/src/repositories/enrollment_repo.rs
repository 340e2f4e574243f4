//! Repository for the `enrollments` table.
//!
//! Enrollment creation wraps the capacity check and the insert in one
//! transaction with a row lock on the event, so concurrent enrollments
//! near capacity cannot overshoot it. Duplicate (event, participant)
//! pairs are resolved by the unique constraint alone.

use aegs_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentDetail, EnrollmentWithEvent};
use crate::models::status::EnrollmentStatus;

const COLUMNS: &str =
    "id, event_id, participant_id, status_id, attendance_confirmed, created_at, updated_at";

/// Join used by listing queries: enrollment + event + participant context.
const DETAIL_COLUMNS: &str = "n.id, n.event_id, e.title AS event_title, t.name AS event_type, \
                               n.participant_id, u.username AS participant_username, \
                               u.display_name AS participant_display_name, \
                               s.name AS status, n.attendance_confirmed, n.created_at, n.updated_at";

const DETAIL_JOINS: &str = "FROM enrollments n
             JOIN events e ON e.id = n.event_id
             JOIN event_types t ON t.id = e.event_type_id
             JOIN users u ON u.id = n.participant_id
             JOIN enrollment_statuses s ON s.id = n.status_id";

/// Errors from enrollment creation beyond plain database failures.
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    #[error("Event {0} not found")]
    EventNotFound(DbId),

    #[error("Event {0} is at full capacity")]
    EventFull(DbId),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides CRUD operations for enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Insert a new enrollment with status pending and attendance false.
    ///
    /// Takes a `FOR UPDATE` lock on the event row, counts non-canceled
    /// enrollments, and rejects with [`EnrollError::EventFull`] when the
    /// event has no free slot. A concurrent duplicate for the same
    /// (event, participant) pair surfaces as a unique violation through
    /// [`EnrollError::Database`].
    pub async fn create(pool: &PgPool, input: &CreateEnrollment) -> Result<Enrollment, EnrollError> {
        let mut tx = pool.begin().await?;

        let capacity: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(input.event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (capacity,) = capacity.ok_or(EnrollError::EventNotFound(input.event_id))?;

        let (occupied,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE event_id = $1 AND status_id <> $2",
        )
        .bind(input.event_id)
        .bind(EnrollmentStatus::Canceled.id())
        .fetch_one(&mut *tx)
        .await?;

        if occupied >= i64::from(capacity) {
            return Err(EnrollError::EventFull(input.event_id));
        }

        let query = format!(
            "INSERT INTO enrollments (event_id, participant_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let enrollment = sqlx::query_as::<_, Enrollment>(&query)
            .bind(input.event_id)
            .bind(input.participant_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(enrollment)
    }

    /// Find an enrollment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an enrollment joined with its event's organizer, for policy
    /// checks.
    pub async fn find_with_event(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EnrollmentWithEvent>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentWithEvent>(
            "SELECT n.id, n.event_id, n.participant_id, n.status_id,
                    n.attendance_confirmed, e.organizer_id
             FROM enrollments n
             JOIN events e ON e.id = n.event_id
             WHERE n.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List a participant's enrollments with event context, newest first.
    pub async fn list_by_participant(
        pool: &PgPool,
        participant_id: DbId,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_JOINS}
             WHERE n.participant_id = $1
             ORDER BY n.created_at DESC"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(participant_id)
            .fetch_all(pool)
            .await
    }

    /// List an event's enrollments with participant context, oldest first.
    pub async fn list_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_JOINS}
             WHERE n.event_id = $1
             ORDER BY n.created_at"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a status transition.
    ///
    /// Leaving `confirmed` resets `attendance_confirmed` to false in the
    /// same statement, so the attendance gating invariant never breaks,
    /// even transiently. Callers validate the transition against
    /// [`EnrollmentStatus::can_transition_to`] first.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET
                status_id = $2,
                attendance_confirmed = CASE WHEN $2 = $3 THEN attendance_confirmed ELSE FALSE END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(status.id())
            .bind(EnrollmentStatus::Confirmed.id())
            .fetch_optional(pool)
            .await
    }

    /// Set the attendance flag. The database check constraint rejects
    /// marking attendance on anything but a confirmed enrollment; callers
    /// pre-check the status to surface a friendlier validation error.
    pub async fn set_attendance(
        pool: &PgPool,
        id: DbId,
        attended: bool,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET attendance_confirmed = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(attended)
            .fetch_optional(pool)
            .await
    }

    /// Delete an enrollment. Its certificate, if any, cascades.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

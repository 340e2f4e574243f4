//! Enrollment entity model and DTOs.

use aegs_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::EnrollmentStatus;

/// Full enrollment row from the `enrollments` table.
#[derive(Debug, Clone, FromRow)]
pub struct Enrollment {
    pub id: DbId,
    pub event_id: DbId,
    pub participant_id: DbId,
    pub status_id: i16,
    pub attendance_confirmed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enrollment {
    /// The typed status of this row.
    ///
    /// # Panics
    ///
    /// Panics on an unknown status id, which can only happen if the row
    /// bypassed the foreign key into `enrollment_statuses`.
    pub fn status(&self) -> EnrollmentStatus {
        EnrollmentStatus::from_id(self.status_id)
            .unwrap_or_else(|| panic!("unknown enrollment status id {}", self.status_id))
    }
}

/// Enrollment row joined with participant and event context, as returned
/// by listing queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentDetail {
    pub id: DbId,
    pub event_id: DbId,
    pub event_title: Option<String>,
    pub event_type: String,
    pub participant_id: DbId,
    pub participant_username: String,
    pub participant_display_name: String,
    pub status: String,
    pub attendance_confirmed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Enrollment row joined with the owning event's organizer, used for
/// object-level policy checks.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentWithEvent {
    pub id: DbId,
    pub event_id: DbId,
    pub participant_id: DbId,
    pub status_id: i16,
    pub attendance_confirmed: bool,
    pub organizer_id: DbId,
}

impl EnrollmentWithEvent {
    /// The typed status of this row. See [`Enrollment::status`].
    pub fn status(&self) -> EnrollmentStatus {
        EnrollmentStatus::from_id(self.status_id)
            .unwrap_or_else(|| panic!("unknown enrollment status id {}", self.status_id))
    }
}

/// DTO for creating a new enrollment. Status always starts as pending and
/// attendance as false.
#[derive(Debug, Deserialize)]
pub struct CreateEnrollment {
    pub event_id: DbId,
    pub participant_id: DbId,
}

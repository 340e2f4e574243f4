//! Certificate entity model and DTOs.

use aegs_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full certificate row from the `certificates` table. Immutable once
/// issued.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Certificate {
    pub id: DbId,
    pub enrollment_id: DbId,
    /// NULL when issued by the batch job rather than a named user.
    pub issued_by: Option<DbId>,
    pub code: String,
    pub workload_hours: i32,
    pub valid_until: Option<Date>,
    pub notes: Option<String>,
    pub issued_at: Timestamp,
}

/// Certificate row joined with its enrollment's event and holder, as
/// returned by listing queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CertificateDetail {
    pub id: DbId,
    pub enrollment_id: DbId,
    pub event_id: DbId,
    pub event_title: Option<String>,
    pub holder_id: DbId,
    pub holder_display_name: String,
    pub issued_by: Option<DbId>,
    pub code: String,
    pub workload_hours: i32,
    pub valid_until: Option<Date>,
    pub notes: Option<String>,
    pub issued_at: Timestamp,
}

/// DTO for issuing a new certificate.
#[derive(Debug, Deserialize)]
pub struct CreateCertificate {
    pub enrollment_id: DbId,
    pub issued_by: Option<DbId>,
    /// Empty or absent codes are replaced by a synthesized one at insert.
    pub code: Option<String>,
    pub workload_hours: i32,
    pub valid_until: Option<Date>,
    pub notes: Option<String>,
}

//! Repository for the `certificates` table.

use aegs_core::certificate::{generate_code, needs_generated_code};
use aegs_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::certificate::{Certificate, CertificateDetail, CreateCertificate};
use crate::models::status::EnrollmentStatus;

const COLUMNS: &str =
    "id, enrollment_id, issued_by, code, workload_hours, valid_until, notes, issued_at";

/// Join used by listing queries: certificate + enrollment + event + holder.
const DETAIL_COLUMNS: &str = "c.id, c.enrollment_id, n.event_id, e.title AS event_title, \
                               n.participant_id AS holder_id, \
                               u.display_name AS holder_display_name, c.issued_by, c.code, \
                               c.workload_hours, c.valid_until, c.notes, c.issued_at";

const DETAIL_JOINS: &str = "FROM certificates c
             JOIN enrollments n ON n.id = c.enrollment_id
             JOIN events e ON e.id = n.event_id
             JOIN users u ON u.id = n.participant_id";

/// Maximum retries on a (vanishingly unlikely) synthesized-code collision.
const CODE_RETRY_LIMIT: usize = 3;

/// Provides CRUD operations for certificates.
pub struct CertificateRepo;

impl CertificateRepo {
    /// Insert a new certificate, returning the created row.
    ///
    /// Empty or absent codes are replaced with a synthesized 32-hex
    /// lowercase code; a collision on the code constraint retries with a
    /// fresh code up to [`CODE_RETRY_LIMIT`] times. Any other constraint
    /// violation (duplicate enrollment, missing references) propagates.
    pub async fn create(pool: &PgPool, input: &CreateCertificate) -> Result<Certificate, sqlx::Error> {
        let synthesize = needs_generated_code(input.code.as_deref());
        let mut code = if synthesize {
            generate_code()
        } else {
            input.code.clone().unwrap_or_default()
        };

        let query = format!(
            "INSERT INTO certificates (enrollment_id, issued_by, code, workload_hours, valid_until, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );

        let mut attempts = 0;
        loop {
            let result = sqlx::query_as::<_, Certificate>(&query)
                .bind(input.enrollment_id)
                .bind(input.issued_by)
                .bind(&code)
                .bind(input.workload_hours)
                .bind(input.valid_until)
                .bind(&input.notes)
                .fetch_one(pool)
                .await;

            match result {
                Err(sqlx::Error::Database(db_err))
                    if synthesize
                        && attempts < CODE_RETRY_LIMIT
                        && db_err.constraint() == Some("uq_certificates_code") =>
                {
                    attempts += 1;
                    code = generate_code();
                }
                other => return other,
            }
        }
    }

    /// Find a certificate by internal ID, with event and holder context.
    pub async fn find_detail_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CertificateDetail>, sqlx::Error> {
        let query = format!("SELECT {DETAIL_COLUMNS} {DETAIL_JOINS} WHERE c.id = $1");
        sqlx::query_as::<_, CertificateDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the certificate issued against an enrollment, if any.
    pub async fn find_by_enrollment(
        pool: &PgPool,
        enrollment_id: DbId,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM certificates WHERE enrollment_id = $1");
        sqlx::query_as::<_, Certificate>(&query)
            .bind(enrollment_id)
            .fetch_optional(pool)
            .await
    }

    /// List a holder's certificates, newest first.
    pub async fn list_by_holder(
        pool: &PgPool,
        holder_id: DbId,
    ) -> Result<Vec<CertificateDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_JOINS}
             WHERE n.participant_id = $1
             ORDER BY c.issued_at DESC"
        );
        sqlx::query_as::<_, CertificateDetail>(&query)
            .bind(holder_id)
            .fetch_all(pool)
            .await
    }

    /// Issue certificates for every eligible enrollment of a finished
    /// event that does not have one yet: event ended before `today`,
    /// status confirmed, attendance confirmed.
    ///
    /// Idempotent: rows that gained a certificate since the scan (or from
    /// a concurrent run) are skipped via the unique enrollment constraint.
    /// Returns the number of certificates issued.
    pub async fn issue_missing_for_finished_events(
        pool: &PgPool,
        today: Date,
    ) -> Result<u64, sqlx::Error> {
        let eligible: Vec<(DbId, i32)> = sqlx::query_as(
            "SELECT n.id, e.workload_hours
             FROM enrollments n
             JOIN events e ON e.id = n.event_id
             LEFT JOIN certificates c ON c.enrollment_id = n.id
             WHERE e.ends_on < $1
               AND n.status_id = $2
               AND n.attendance_confirmed = TRUE
               AND c.id IS NULL
             ORDER BY n.id",
        )
        .bind(today)
        .bind(EnrollmentStatus::Confirmed.id())
        .fetch_all(pool)
        .await?;

        let mut issued = 0;
        for (enrollment_id, workload_hours) in eligible {
            let input = CreateCertificate {
                enrollment_id,
                issued_by: None,
                code: None,
                workload_hours,
                valid_until: None,
                notes: None,
            };
            match Self::create(pool, &input).await {
                Ok(_) => issued += 1,
                Err(sqlx::Error::Database(db_err))
                    if db_err.constraint() == Some("uq_certificates_enrollment") =>
                {
                    // A concurrent run won the race for this enrollment.
                    tracing::debug!(enrollment_id, "certificate already issued, skipping");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(issued)
    }
}

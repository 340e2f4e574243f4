//! Handlers for the `/certificates` resource.
//!
//! Issuance is gated on eligibility: the target enrollment must be
//! confirmed with attendance confirmed. Certificates are immutable once
//! issued.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use aegs_core::error::CoreError;
use aegs_core::policy::{decide, Action};
use aegs_core::types::{Date, DbId};
use aegs_db::models::certificate::{CertificateDetail, CreateCertificate};
use aegs_db::models::status::EnrollmentStatus;
use aegs_db::repositories::{CertificateRepo, EnrollmentRepo};

use crate::audit::{self, actions};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /certificates`.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueCertificateRequest {
    pub enrollment_id: DbId,
    #[validate(range(min = 1))]
    pub workload_hours: i32,
    /// Optional explicit code; empty or absent codes are synthesized.
    #[validate(length(max = 36))]
    pub code: Option<String>,
    pub valid_until: Option<Date>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/certificates
///
/// Issue a certificate against an eligible enrollment. 201 Created; 409 if
/// the enrollment already has one; 400 if the enrollment is not eligible.
pub async fn issue(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<IssueCertificateRequest>,
) -> AppResult<(StatusCode, Json<CertificateDetail>)> {
    input.validate()?;

    let enrollment = EnrollmentRepo::find_with_event(&state.pool, input.enrollment_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Reference(format!(
                "Enrollment {} does not exist",
                input.enrollment_id
            )))
        })?;

    let owns = enrollment.organizer_id == user.user_id;
    if !decide(user.role, Action::IssueCertificate, owns).is_allowed() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not manage this enrollment's event".into(),
        )));
    }

    // Eligibility gate: confirmed status with confirmed attendance.
    if enrollment.status() != EnrollmentStatus::Confirmed || !enrollment.attendance_confirmed {
        return Err(AppError::Core(CoreError::Validation(
            "Certificates require a confirmed enrollment with confirmed attendance".into(),
        )));
    }

    let create_dto = CreateCertificate {
        enrollment_id: input.enrollment_id,
        issued_by: Some(user.user_id),
        code: input.code,
        workload_hours: input.workload_hours,
        valid_until: input.valid_until,
        notes: input.notes,
    };
    let certificate = CertificateRepo::create(&state.pool, &create_dto)
        .await
        .map_err(map_issue_error)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        actions::CERTIFICATE_ISSUED,
        "certificate",
        certificate.id,
        Some(serde_json::json!({ "enrollment_id": input.enrollment_id })),
    )
    .await;

    let detail = CertificateRepo::find_detail_by_id(&state.pool, certificate.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Issued certificate vanished".into()))?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/certificates/mine
///
/// List the caller's certificates, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<CertificateDetail>>> {
    let certificates = CertificateRepo::list_by_holder(&state.pool, user.user_id).await?;
    Ok(Json(certificates))
}

/// GET /api/v1/certificates/{id}
///
/// Fetch a certificate. Visible to its holder, the organizer of the
/// underlying event, and admins.
pub async fn get_certificate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<CertificateDetail>> {
    let detail = CertificateRepo::find_detail_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Certificate",
            id,
        }))?;

    let enrollment = EnrollmentRepo::find_with_event(&state.pool, detail.enrollment_id)
        .await?
        .ok_or_else(|| AppError::InternalError("Certificate without enrollment".into()))?;

    let owns = detail.holder_id == user.user_id || enrollment.organizer_id == user.user_id;
    if !decide(user.role, Action::ViewCertificate, owns).is_allowed() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this certificate".into(),
        )));
    }

    Ok(Json(detail))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wrap the uniqueness violations from issuance into domain conflicts.
fn map_issue_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some("uq_certificates_enrollment") => {
                return AppError::Core(CoreError::Conflict(
                    "Enrollment already has a certificate".into(),
                ));
            }
            Some("uq_certificates_code") => {
                return AppError::Core(CoreError::Conflict(
                    "Certificate code is already in use".into(),
                ));
            }
            _ => {}
        }
    }
    err.into()
}

//! Best-effort audit trail writer.
//!
//! Audit failures are logged and swallowed: the trail must never fail the
//! request that triggered it.

use aegs_core::types::DbId;
use aegs_db::models::audit::CreateAuditLog;
use aegs_db::repositories::AuditRepo;
use aegs_db::DbPool;

/// Well-known audit action names.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const USER_CREATED: &str = "user_created";
    pub const EVENT_CREATED: &str = "event_created";
    pub const EVENT_UPDATED: &str = "event_updated";
    pub const EVENT_DELETED: &str = "event_deleted";
    pub const ENROLLMENT_CREATED: &str = "enrollment_created";
    pub const ENROLLMENT_UPDATED: &str = "enrollment_updated";
    pub const CERTIFICATE_ISSUED: &str = "certificate_issued";
}

/// Record an audit entry for `action` performed by `user_id` on the given
/// entity.
pub async fn record(
    pool: &DbPool,
    user_id: Option<DbId>,
    action: &str,
    entity_type: &str,
    entity_id: DbId,
    details: Option<serde_json::Value>,
) {
    let input = CreateAuditLog {
        user_id,
        action: action.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id),
        details,
    };
    if let Err(e) = AuditRepo::create(pool, &input).await {
        tracing::warn!(error = %e, action, entity_type, entity_id, "failed to write audit entry");
    }
}

//! Repository for the append-only `audit_logs` table.

use aegs_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

const COLUMNS: &str = "id, user_id, action, entity_type, entity_id, details, created_at";

/// Provides insert and query operations for audit log entries.
pub struct AuditRepo;

impl AuditRepo {
    /// Insert a new audit entry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(input.user_id)
            .bind(&input.action)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// List the most recent entries across the whole system.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List the most recent entries visible to an organizer: their own
    /// actions plus entries about events they organize.
    pub async fn list_recent_for_organizer(
        pool: &PgPool,
        organizer_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE user_id = $1
                OR (entity_type = 'event'
                    AND entity_id IN (SELECT id FROM events WHERE organizer_id = $1))
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(organizer_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

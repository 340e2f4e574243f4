//! Repository for the seeded `roles` table.

use aegs_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::RoleRow;

const COLUMNS: &str = "id, name, description, created_at";

/// Read-only access to the roles lookup table.
pub struct RoleRepo;

impl RoleRepo {
    /// List all roles in seed order.
    pub async fn list(pool: &PgPool) -> Result<Vec<RoleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id");
        sqlx::query_as::<_, RoleRow>(&query).fetch_all(pool).await
    }

    /// Find a role by its seeded name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<RoleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, RoleRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a role id to its name. Errors with `RowNotFound` for ids
    /// outside the seeded set.
    pub async fn resolve_name(pool: &PgPool, id: DbId) -> Result<String, sqlx::Error> {
        let (name,): (String,) = sqlx::query_as("SELECT name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(name)
    }
}

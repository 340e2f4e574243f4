//! Role lookup entity.

use aegs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the seeded `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

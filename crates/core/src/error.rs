use crate::types::DbId;

/// Domain error taxonomy shared by every crate in the workspace.
///
/// Storage-level constraint violations are translated into one of these
/// variants at the persistence boundary; raw driver errors never reach
/// callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced row is missing, or a deletion is blocked by rows that
    /// still reference the target.
    #[error("Reference violation: {0}")]
    Reference(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

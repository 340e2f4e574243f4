//! Identity invariants.

use crate::error::CoreError;
use crate::roles::Role;

/// Whether `role` requires a non-empty institution on the account.
pub fn institution_required(role: Role) -> bool {
    role.is_participant()
}

/// Validate the role/institution invariant for a new or updated account.
///
/// Students and professors must carry a non-empty institution; organizers
/// and admins may leave it unset.
pub fn validate_institution(role: Role, institution: Option<&str>) -> Result<(), CoreError> {
    if institution_required(role) {
        match institution {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(CoreError::Validation(format!(
                "Institution is required for the {} role",
                role.name()
            ))),
        }
    } else {
        Ok(())
    }
}

//! Well-known role names and the typed [`Role`] enum.
//!
//! The name constants must match the seed data in
//! `20250801000001_create_roles_table.sql`.

use serde::{Deserialize, Serialize};

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PROFESSOR: &str = "professor";
pub const ROLE_ORGANIZER: &str = "organizer";
pub const ROLE_ADMIN: &str = "admin";

/// A user's role, parsed from the role name stored in the database and
/// carried in JWT claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Professor,
    Organizer,
    Admin,
}

impl Role {
    /// Parse a role from its seeded name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            ROLE_STUDENT => Some(Role::Student),
            ROLE_PROFESSOR => Some(Role::Professor),
            ROLE_ORGANIZER => Some(Role::Organizer),
            ROLE_ADMIN => Some(Role::Admin),
            _ => None,
        }
    }

    /// The seeded role name.
    pub fn name(self) -> &'static str {
        match self {
            Role::Student => ROLE_STUDENT,
            Role::Professor => ROLE_PROFESSOR,
            Role::Organizer => ROLE_ORGANIZER,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Whether this role participates in events (enrolls, holds certificates).
    pub fn is_participant(self) -> bool {
        matches!(self, Role::Student | Role::Professor)
    }

    /// Whether this role manages events and enrollments.
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Organizer | Role::Admin)
    }
}

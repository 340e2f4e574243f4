//! The access policy decision function.
//!
//! A single pure function maps (role, action, target ownership) to a
//! decision, replacing scattered conditional checks so the whole matrix is
//! unit-testable. Route-level gates in the API layer narrow by role first;
//! object-level decisions always go through [`decide`].

use crate::roles::Role;

/// Actions governed by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a new user account.
    RegisterIdentity,
    /// Create, update, or delete an event.
    ManageEvent,
    /// Change an enrollment's status or attendance, or remove it.
    ManageEnrollment,
    /// Create an enrollment (self-service or on behalf of a participant).
    CreateEnrollment,
    /// Issue a certificate against an enrollment.
    IssueCertificate,
    /// Read a certificate.
    ViewCertificate,
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Decide whether `role` may perform `action`.
///
/// `owns_target` means the actor owns the action's target: for organizers,
/// the target event (or the enrollment/certificate of an event) is one they
/// organize; for participants, the target enrollment or certificate is
/// their own. Admins are never ownership-restricted.
pub fn decide(role: Role, action: Action, owns_target: bool) -> Decision {
    use Action::*;
    use Role::*;

    let allowed = match (role, action) {
        (Admin, _) => true,

        (Organizer, RegisterIdentity) => false,
        (Organizer, ManageEvent) => owns_target,
        (Organizer, ManageEnrollment) => owns_target,
        (Organizer, CreateEnrollment) => true,
        (Organizer, IssueCertificate) => owns_target,
        (Organizer, ViewCertificate) => owns_target,

        (Student | Professor, CreateEnrollment) => owns_target,
        (Student | Professor, ViewCertificate) => owns_target,
        (Student | Professor, _) => false,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Action::*;
    use Decision::*;
    use Role::*;

    const PARTICIPANTS: [Role; 2] = [Student, Professor];

    #[test]
    fn admin_is_unrestricted() {
        for action in [
            RegisterIdentity,
            ManageEvent,
            ManageEnrollment,
            CreateEnrollment,
            IssueCertificate,
            ViewCertificate,
        ] {
            assert_eq!(decide(Admin, action, false), Allow);
            assert_eq!(decide(Admin, action, true), Allow);
        }
    }

    #[test]
    fn only_admin_registers_identities() {
        for role in [Student, Professor, Organizer] {
            assert_eq!(decide(role, RegisterIdentity, true), Deny);
            assert_eq!(decide(role, RegisterIdentity, false), Deny);
        }
    }

    #[test]
    fn organizer_manages_own_events_only() {
        assert_eq!(decide(Organizer, ManageEvent, true), Allow);
        assert_eq!(decide(Organizer, ManageEvent, false), Deny);
        assert_eq!(decide(Organizer, ManageEnrollment, true), Allow);
        assert_eq!(decide(Organizer, ManageEnrollment, false), Deny);
    }

    #[test]
    fn participants_never_manage() {
        for role in PARTICIPANTS {
            for owns in [true, false] {
                assert_eq!(decide(role, ManageEvent, owns), Deny);
                assert_eq!(decide(role, ManageEnrollment, owns), Deny);
                assert_eq!(decide(role, IssueCertificate, owns), Deny);
            }
        }
    }

    #[test]
    fn participants_enroll_themselves_only() {
        for role in PARTICIPANTS {
            assert_eq!(decide(role, CreateEnrollment, true), Allow);
            assert_eq!(decide(role, CreateEnrollment, false), Deny);
        }
    }

    #[test]
    fn managers_create_enrollments_for_others() {
        assert_eq!(decide(Organizer, CreateEnrollment, false), Allow);
        assert_eq!(decide(Admin, CreateEnrollment, false), Allow);
    }

    #[test]
    fn certificate_issuance_is_manager_scoped() {
        assert_eq!(decide(Organizer, IssueCertificate, true), Allow);
        assert_eq!(decide(Organizer, IssueCertificate, false), Deny);
    }

    #[test]
    fn certificate_visibility() {
        for role in PARTICIPANTS {
            assert_eq!(decide(role, ViewCertificate, true), Allow);
            assert_eq!(decide(role, ViewCertificate, false), Deny);
        }
        assert_eq!(decide(Organizer, ViewCertificate, true), Allow);
        assert_eq!(decide(Organizer, ViewCertificate, false), Deny);
        assert_eq!(decide(Admin, ViewCertificate, false), Allow);
    }
}

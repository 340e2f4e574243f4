//! Lookup-table enums mapping to SMALLSERIAL/SMALLINT reference tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding database table.

/// Lookup id type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database lookup id.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database lookup id back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Enrollment lifecycle status, seeded in `enrollment_statuses`.
    EnrollmentStatus {
        Pending = 1,
        Confirmed = 2,
        Canceled = 3,
    }
}

define_status_enum! {
    /// Event type, seeded in `event_types`.
    EventType {
        Lecture = 1,
        Workshop = 2,
        ShortCourse = 3,
        Seminar = 4,
        Other = 5,
    }
}

impl EnrollmentStatus {
    /// The seeded status name.
    pub fn name(self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Confirmed => "confirmed",
            EnrollmentStatus::Canceled => "canceled",
        }
    }

    /// Parse a seeded status name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(EnrollmentStatus::Pending),
            "confirmed" => Some(EnrollmentStatus::Confirmed),
            "canceled" => Some(EnrollmentStatus::Canceled),
            _ => None,
        }
    }

    /// Whether the enrollment may move from `self` to `next`.
    ///
    /// Pending enrollments may be confirmed or canceled; confirmed
    /// enrollments may only be canceled; canceled is terminal.
    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Canceled) | (Confirmed, Canceled)
        )
    }

    /// Whether an enrollment in this status occupies a capacity slot.
    pub fn counts_against_capacity(self) -> bool {
        self != EnrollmentStatus::Canceled
    }
}

impl EventType {
    /// The seeded type name.
    pub fn name(self) -> &'static str {
        match self {
            EventType::Lecture => "lecture",
            EventType::Workshop => "workshop",
            EventType::ShortCourse => "short_course",
            EventType::Seminar => "seminar",
            EventType::Other => "other",
        }
    }

    /// Parse a seeded type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lecture" => Some(EventType::Lecture),
            "workshop" => Some(EventType::Workshop),
            "short_course" => Some(EventType::ShortCourse),
            "seminar" => Some(EventType::Seminar),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_status_ids_match_seed_data() {
        assert_eq!(EnrollmentStatus::Pending.id(), 1);
        assert_eq!(EnrollmentStatus::Confirmed.id(), 2);
        assert_eq!(EnrollmentStatus::Canceled.id(), 3);
    }

    #[test]
    fn event_type_ids_match_seed_data() {
        assert_eq!(EventType::Lecture.id(), 1);
        assert_eq!(EventType::Workshop.id(), 2);
        assert_eq!(EventType::ShortCourse.id(), 3);
        assert_eq!(EventType::Seminar.id(), 4);
        assert_eq!(EventType::Other.id(), 5);
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            EnrollmentStatus::Pending,
            EnrollmentStatus::Confirmed,
            EnrollmentStatus::Canceled,
        ] {
            assert_eq!(EnrollmentStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(EnrollmentStatus::from_id(0), None);
        assert_eq!(EnrollmentStatus::from_id(4), None);
    }

    #[test]
    fn transition_matrix() {
        use EnrollmentStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Canceled));
        assert!(Confirmed.can_transition_to(Canceled));

        assert!(!Pending.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(!Canceled.can_transition_to(Pending));
        assert!(!Canceled.can_transition_to(Confirmed));
        assert!(!Canceled.can_transition_to(Canceled));
    }

    #[test]
    fn canceled_frees_capacity() {
        assert!(EnrollmentStatus::Pending.counts_against_capacity());
        assert!(EnrollmentStatus::Confirmed.counts_against_capacity());
        assert!(!EnrollmentStatus::Canceled.counts_against_capacity());
    }
}

//! Shared fixtures for the db integration tests.

use aegs_core::types::DbId;
use sqlx::PgPool;

use aegs_db::models::event::CreateEvent;
use aegs_db::models::status::EventType;
use aegs_db::models::user::{CreateUser, User};
use aegs_db::repositories::{EventRepo, RoleRepo, UserRepo};

/// Create a user with the given role name. Participants get a default
/// institution so the application-level invariant holds for fixtures too.
pub async fn create_user(pool: &PgPool, username: &str, role_name: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role_name)
        .await
        .expect("role lookup should succeed")
        .unwrap_or_else(|| panic!("role {role_name} should be seeded"));

    let institution = match role_name {
        "student" | "professor" => Some("UFMG".to_string()),
        _ => None,
    };

    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.edu"),
        password_hash: "$argon2id$test-hash".to_string(),
        display_name: format!("Test {username}"),
        phone: "5531999990000".to_string(),
        institution,
        role_id: role.id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Create an event organized by `organizer_id` with the given capacity.
pub async fn create_event(pool: &PgPool, organizer_id: DbId, capacity: i32) -> aegs_db::models::event::Event {
    let input = CreateEvent {
        event_type_id: EventType::Workshop.id(),
        title: Some("Intro to Databases".to_string()),
        location: "Auditorium 1".to_string(),
        starts_on: chrono::NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
        ends_on: chrono::NaiveDate::from_ymd_opt(2025, 10, 11).unwrap(),
        capacity,
        workload_hours: 8,
        organizer_id,
    };
    EventRepo::create(pool, &input)
        .await
        .expect("event creation should succeed")
}

/// Assert that a sqlx error is a PostgreSQL violation of the named
/// constraint.
pub fn assert_constraint(err: &sqlx::Error, constraint: &str) {
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(
                db_err.constraint(),
                Some(constraint),
                "expected violation of {constraint}, got: {db_err}"
            );
        }
        other => panic!("expected database error for {constraint}, got: {other}"),
    }
}

//! Integration tests for the error taxonomy: constraint violations are
//! translated into structured JSON errors and never leak raw storage
//! errors.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, login_token, post_json_auth, seed_user};
use sqlx::PgPool;

fn user_body(username: &str, role: &str, institution: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@test.edu"),
        "password": "a-long-enough-password",
        "display_name": "New Person",
        "phone": "5531988887777",
        "institution": institution,
        "role": role,
    })
}

/// Registering a student without an institution fails the invariant.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_registration_institution_invariant(pool: PgPool) {
    seed_user(&pool, "adm1", "admin").await;
    let token = login_token(common::build_test_app(pool.clone()), "adm1").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/users",
        &token,
        user_body("newstudent", "student", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // With an institution the same request succeeds.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/users",
        &token,
        user_body("newstudent", "student", Some("UFMG")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Organizers register fine without one.
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/users",
        &token,
        user_body("neworg", "organizer", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// A duplicate username surfaces as 409 CONFLICT, not a raw database error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_translated(pool: PgPool) {
    seed_user(&pool, "adm1", "admin").await;
    seed_user(&pool, "taken", "student").await;
    let token = login_token(common::build_test_app(pool.clone()), "adm1").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/users",
        &token,
        user_body("taken", "student", Some("UFMG")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].is_string());
}

/// Registration is admin-only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_registration_requires_admin(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    let token = login_token(common::build_test_app(pool.clone()), "org1").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/users",
        &token,
        user_body("sneaky", "student", Some("UFMG")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "PERMISSION_ERROR");
}

/// An unknown role name fails validation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_role_rejected(pool: PgPool) {
    seed_user(&pool, "adm1", "admin").await;
    let token = login_token(common::build_test_app(pool.clone()), "adm1").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/users",
        &token,
        user_body("visitor", "visitor", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

/// The participants listing is manager-only and shows only participants.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_participants_listing(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;
    seed_user(&pool, "prof1", "professor").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu_token = login_token(common::build_test_app(pool.clone()), "stu1").await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/participants",
        &org_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2, "only participant roles are listed");

    let response = get_auth(common::build_test_app(pool), "/api/v1/participants", &stu_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// The health endpoint responds without authentication.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_endpoint(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}

/// The audit trail records mutations and scopes organizer visibility.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_trail(pool: PgPool) {
    seed_user(&pool, "adm1", "admin").await;
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;

    let admin_token = login_token(common::build_test_app(pool.clone()), "adm1").await;
    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu_token = login_token(common::build_test_app(pool.clone()), "stu1").await;

    common::seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/audit", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries = body_json(response).await;
    let actions: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"event_created"), "audit must record event creation");
    assert!(actions.contains(&"login"), "audit must record logins");

    // Participants cannot read the trail.
    let response = get_auth(common::build_test_app(pool), "/api/v1/audit", &stu_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

//! HTTP-level integration tests for the enrollments resource: the
//! self-service flow, duplicate and capacity conflicts, the status state
//! machine, and attendance gating.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get_auth, login_token, post_json_auth, put_json_auth, seed_event_via_api, seed_user,
};
use sqlx::PgPool;

/// Enroll a participant via the self-service route, returning the
/// enrollment id.
async fn enroll(pool: &PgPool, token: &str, event_id: i64) -> i64 {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/enrollments",
        token,
        serde_json::json!({ "event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Self-enrollment creates a pending enrollment bound to the caller.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_self_enrolls(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    let student = seed_user(&pool, "stu1", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/enrollments",
        &stu_token,
        serde_json::json!({ "event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["event_id"], event_id);
    assert_eq!(json["participant_id"], student.id);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["attendance_confirmed"], false);
}

/// Enrolling twice in the same event returns 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_enrollment_conflicts(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    enroll(&pool, &stu_token, event_id).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/enrollments",
        &stu_token,
        serde_json::json!({ "event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

/// Organizers cannot use the self-service enrollment route.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_organizer_cannot_self_enroll(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/enrollments",
        &org_token,
        serde_json::json!({ "event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A full event rejects further enrollments with a validation error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_event_rejects_enrollment(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;
    seed_user(&pool, "stu2", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu1_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let stu2_token = login_token(common::build_test_app(pool.clone()), "stu2").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 1).await;

    enroll(&pool, &stu1_token, event_id).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/enrollments",
        &stu2_token,
        serde_json::json!({ "event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

/// Managers enroll named participants through the event-scoped route.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_managed_enrollment(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    let professor = seed_user(&pool, "prof1", "professor").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/events/{event_id}/enrollments"),
        &org_token,
        serde_json::json!({ "participant_id": professor.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["participant_id"], professor.id);
}

/// Only participant accounts can be enrolled.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_managed_enrollment_rejects_manager_participant(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    let other_org = seed_user(&pool, "org2", "organizer").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/events/{event_id}/enrollments"),
        &org_token,
        serde_json::json!({ "participant_id": other_org.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Status transitions: confirm, then cancel; a second confirm is invalid.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_state_machine(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;
    let enrollment_id = enroll(&pool, &stu_token, event_id).await;

    // pending -> confirmed
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/status"),
        &org_token,
        serde_json::json!({ "status": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "confirmed");

    // confirmed -> confirmed is not a valid transition
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/status"),
        &org_token,
        serde_json::json!({ "status": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // confirmed -> canceled
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/status"),
        &org_token,
        serde_json::json!({ "status": "canceled" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // canceled is terminal
    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/enrollments/{enrollment_id}/status"),
        &org_token,
        serde_json::json!({ "status": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Attendance on a pending enrollment is rejected; after confirmation it
/// succeeds; cancellation clears it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attendance_gating(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;
    let enrollment_id = enroll(&pool, &stu_token, event_id).await;

    // Attendance on pending fails.
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/attendance"),
        &org_token,
        serde_json::json!({ "attended": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // Confirm, then attendance succeeds.
    put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/status"),
        &org_token,
        serde_json::json!({ "status": "confirmed" }),
    )
    .await;
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/attendance"),
        &org_token,
        serde_json::json!({ "attended": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["attendance_confirmed"], true);

    // Canceling clears the flag.
    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/enrollments/{enrollment_id}/status"),
        &org_token,
        serde_json::json!({ "status": "canceled" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "canceled");
    assert_eq!(json["attendance_confirmed"], false);
}

/// Participants cancel their own enrollments; other students cannot.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_permissions(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;
    seed_user(&pool, "stu2", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu1_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let stu2_token = login_token(common::build_test_app(pool.clone()), "stu2").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;
    let enrollment_id = enroll(&pool, &stu1_token, event_id).await;

    // Another student cannot cancel it.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/enrollments/{enrollment_id}/cancel"),
        &stu2_token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner can.
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/enrollments/{enrollment_id}/cancel"),
        &stu1_token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "canceled");
}

/// `/enrollments/mine` lists only the caller's enrollments.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_mine(pool: PgPool) {
    seed_user(&pool, "org1", "organizer").await;
    seed_user(&pool, "stu1", "student").await;
    seed_user(&pool, "stu2", "student").await;

    let org_token = login_token(common::build_test_app(pool.clone()), "org1").await;
    let stu1_token = login_token(common::build_test_app(pool.clone()), "stu1").await;
    let stu2_token = login_token(common::build_test_app(pool.clone()), "stu2").await;
    let event_id = seed_event_via_api(common::build_test_app(pool.clone()), &org_token, 10).await;

    enroll(&pool, &stu1_token, event_id).await;
    enroll(&pool, &stu2_token, event_id).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/enrollments/mine",
        &stu1_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["participant_username"], "stu1");
}

//! Shared fixtures and request helpers for the HTTP integration tests.
//!
//! [`build_test_app`] uses the same router builder as `main.rs`, so tests
//! exercise the exact middleware stack production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use aegs_api::auth::jwt::JwtConfig;
use aegs_api::auth::password::hash_password;
use aegs_api::config::ServerConfig;
use aegs_api::router::build_app_router;
use aegs_api::state::AppState;
use aegs_db::models::user::{CreateUser, User};
use aegs_db::repositories::{RoleRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        certificate_issuance_enabled: false,
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON POST request without authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON POST request with a bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON PUT request with a bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request with a bearer token.
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!("response body is not JSON ({e}): {}", String::from_utf8_lossy(&bytes))
    })
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Plaintext password used by every test fixture account.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Create a test user directly in the database with the given role name.
pub async fn seed_user(pool: &PgPool, username: &str, role_name: &str) -> User {
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
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        display_name: format!("Test {username}"),
        phone: "5531999990000".to_string(),
        institution,
        role_id: role.id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log a fixture user in via the API and return the full JSON response.
pub async fn login(app: Router, username: &str) -> serde_json::Value {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    body_json(response).await
}

/// Log a fixture user in and return just the access token.
pub async fn login_token(app: Router, username: &str) -> String {
    login(app, username).await["access_token"]
        .as_str()
        .expect("login response must contain access_token")
        .to_string()
}

/// Create an event through the API as the given manager, returning its id.
pub async fn seed_event_via_api(app: Router, token: &str, capacity: i32) -> i64 {
    let body = serde_json::json!({
        "event_type": "workshop",
        "title": "Research Methods Workshop",
        "location": "Auditorium 1",
        "starts_on": "2025-10-10",
        "ends_on": "2025-10-11",
        "capacity": capacity,
        "workload_hours": 8,
    });
    let response = post_json_auth(app, "/api/v1/events", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "event creation should succeed");
    body_json(response).await["id"]
        .as_i64()
        .expect("event response must contain id")
}

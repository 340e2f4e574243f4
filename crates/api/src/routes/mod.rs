pub mod health;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                       login (public)
/// /auth/refresh                     refresh (public)
/// /auth/logout                      logout (requires auth)
///
/// /admin/users                      list, create (admin only)
/// /admin/users/{id}                 get, update, deactivate
/// /admin/users/{id}/reset-password  reset password
///
/// /events                           list, create
/// /events/{id}                      get, update, delete
/// /events/{id}/enrollments          list, managed create (managers)
///
/// /enrollments                      self-enroll (participants)
/// /enrollments/mine                 caller's enrollments
/// /enrollments/{id}/status          transition status (managers)
/// /enrollments/{id}/attendance      set attendance (managers)
/// /enrollments/{id}/cancel          cancel (owner or manager)
/// /enrollments/{id}                 delete (owner or manager)
///
/// /certificates                     issue (managers)
/// /certificates/mine                caller's certificates
/// /certificates/{id}                get (holder, organizer, admin)
///
/// /participants                     participant listing (managers)
/// /audit                            audit trail (managers)
/// ```
pub fn api_routes() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout));

    let admin_routes = Router::new()
        .route(
            "/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::admin::get_user)
                .put(handlers::admin::update_user)
                .delete(handlers::admin::deactivate_user),
        )
        .route(
            "/users/{id}/reset-password",
            post(handlers::admin::reset_password),
        );

    let event_routes = Router::new()
        .route(
            "/",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/{id}",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        .route(
            "/{id}/enrollments",
            get(handlers::events::list_event_enrollments)
                .post(handlers::events::create_managed_enrollment),
        );

    let enrollment_routes = Router::new()
        .route("/", post(handlers::enrollments::enroll))
        .route("/mine", get(handlers::enrollments::list_mine))
        .route("/{id}", axum::routing::delete(handlers::enrollments::delete))
        .route("/{id}/status", put(handlers::enrollments::set_status))
        .route("/{id}/attendance", put(handlers::enrollments::set_attendance))
        .route("/{id}/cancel", post(handlers::enrollments::cancel));

    let certificate_routes = Router::new()
        .route("/", post(handlers::certificates::issue))
        .route("/mine", get(handlers::certificates::list_mine))
        .route("/{id}", get(handlers::certificates::get_certificate));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/events", event_routes)
        .nest("/enrollments", enrollment_routes)
        .nest("/certificates", certificate_routes)
        .route("/participants", get(handlers::participants::list_participants))
        .route("/audit", get(handlers::audit::list_audit))
}

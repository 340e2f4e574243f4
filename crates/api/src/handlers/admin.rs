//! Handlers for the `/admin` resource (identity registration and user
//! management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. Identity
//! registration enforces the role/institution invariant before the insert.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use aegs_core::error::CoreError;
use aegs_core::identity::validate_institution;
use aegs_core::roles::Role;
use aegs_core::types::DbId;
use aegs_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use aegs_db::repositories::{RoleRepo, UserRepo};

use crate::audit::{self, actions};
use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Minimum password length enforced on user creation and password reset.
const MIN_PASSWORD_LENGTH: usize = 12;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
    #[validate(length(min = 8, max = 20))]
    pub phone: String,
    pub institution: Option<String>,
    /// Seeded role name: `student`, `professor`, `organizer`, or `admin`.
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub institution: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Register a new identity. Validates password strength and the
/// role/institution invariant, hashes the password, and returns a safe
/// [`UserResponse`] with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;

    let role = parse_role(&input.role)?;
    validate_institution(role, input.institution.as_deref())?;

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let role_row = RoleRepo::find_by_name(&state.pool, role.name())
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role {} not seeded", role.name())))?;

    let create_dto = CreateUser {
        username: input.username,
        email: input.email,
        password_hash: hashed,
        display_name: input.display_name,
        phone: input.phone,
        institution: input.institution,
        role_id: role_row.id,
    };

    let user = UserRepo::create(&state.pool, &create_dto).await?;

    audit::record(
        &state.pool,
        Some(admin.user_id),
        actions::USER_CREATED,
        "user",
        user.id,
        Some(serde_json::json!({ "username": user.username, "role": role.name() })),
    )
    .await;

    let response = build_user_response(&user, role.name().to_string());
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/admin/users
///
/// List all users with resolved role names.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let responses: Vec<UserResponse> = users
        .iter()
        .map(|u| {
            let role_name = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            build_user_response(u, role_name)
        })
        .collect();

    Ok(Json(responses))
}

/// GET /api/v1/admin/users/{id}
///
/// Get a single user by ID.
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(build_user_response(&user, role_name)))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update a user's profile fields (not password). The role/institution
/// invariant is re-checked against the resulting row.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let current = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    // Resolve the effective role and institution after the patch, and
    // re-check the invariant before writing anything.
    let role = match &input.role {
        Some(name) => parse_role(name)?,
        None => {
            let current_name = RoleRepo::resolve_name(&state.pool, current.role_id).await?;
            parse_role(&current_name)?
        }
    };
    let effective_institution = input
        .institution
        .as_deref()
        .or(current.institution.as_deref());
    validate_institution(role, effective_institution)?;

    let role_row = RoleRepo::find_by_name(&state.pool, role.name())
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role {} not seeded", role.name())))?;

    let update_dto = UpdateUser {
        email: input.email,
        display_name: input.display_name,
        phone: input.phone,
        institution: input.institution,
        role_id: Some(role_row.id),
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(build_user_response(&user, role.name().to_string())))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user (sets `is_active = false`). Returns 204 No
/// Content. Accounts are never hard-deleted through the API; organizers
/// and issuers stay referenced by their events and certificates.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deactivated = UserRepo::deactivate(&state.pool, id).await?;
    if deactivated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Set a new password for a user. Returns 204 No Content.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let updated = UserRepo::update_password(&state.pool, id, &hashed).await?;
    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_role(name: &str) -> Result<Role, AppError> {
    Role::from_name(name)
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role: {name}"))))
}

fn build_user_response(user: &User, role_name: String) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        phone: user.phone.clone(),
        institution: user.institution.clone(),
        role: role_name,
        role_id: user.role_id,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}

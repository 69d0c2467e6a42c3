//! User management (admin only).

use axum::extract::{Path, State};
use axum::{Form, Json};
use tracing::info;

use filedeck_auth::rbac::{Capability, require};
use filedeck_auth::user::model::{CreateUser, UpdateUser};
use filedeck_auth::user::role::UserRole;
use filedeck_core::error::AppError;

use crate::dto::request::{CreateUserForm, UpdateUserForm, validated};
use crate::dto::response::UserResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    require(auth.role, Capability::ManageUsers)?;
    let users = state.users.list();
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Form(form): Form<CreateUserForm>,
) -> ApiResult<Json<UserResponse>> {
    require(auth.role, Capability::ManageUsers)?;
    let form = validated(form)?;

    let role: UserRole = form.role.parse()?;
    check_password_length(&state, &form.password)?;
    let password_hash = state.hasher.hash_password(&form.password)?;

    let user = state
        .users
        .create(CreateUser {
            username: form.username,
            password_hash,
            role,
        })
        .await?;

    info!(username = %user.username, role = %user.role, by = %auth.username, "User created");
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/users/{username}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
    Form(form): Form<UpdateUserForm>,
) -> ApiResult<Json<UserResponse>> {
    require(auth.role, Capability::ManageUsers)?;

    let role = match form.role.as_deref() {
        Some(r) => Some(r.parse::<UserRole>()?),
        None => None,
    };
    let password_hash = match form.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            check_password_length(&state, password)?;
            Some(state.hasher.hash_password(password)?)
        }
        None => None,
    };

    let changes = UpdateUser {
        role,
        password_hash,
    };
    let user = state.users.update(&username, changes).await?;

    info!(username = %user.username, by = %auth.username, "User updated");
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/users/{username}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require(auth.role, Capability::ManageUsers)?;

    // Admins cannot lock themselves out.
    if username == auth.username {
        return Err(AppError::validation("You cannot delete your own account").into());
    }

    state.users.delete(&username).await?;
    info!(username = %username, by = %auth.username, "User deleted");
    Ok(Json(serde_json::json!({ "deleted": username })))
}

fn check_password_length(state: &AppState, password: &str) -> Result<(), AppError> {
    let min = state.config.auth.password_min_length;
    if password.chars().count() < min {
        return Err(AppError::validation(format!(
            "Password must be at least {min} characters"
        )));
    }
    Ok(())
}

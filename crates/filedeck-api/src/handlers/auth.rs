//! Auth handlers — login and profile.

use axum::extract::State;
use axum::{Form, Json};
use tracing::info;

use filedeck_core::error::AppError;

use crate::dto::request::{LoginForm, validated};
use crate::dto::response::{LoginResponse, ProfileResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<LoginResponse>> {
    let form = validated(form)?;

    // One message for both failure modes, so the endpoint never reveals
    // which usernames exist.
    let user = state
        .users
        .get(&form.username)
        .ok_or_else(|| AppError::unauthorized("Incorrect username or password"))?;

    if !state
        .hasher
        .verify_password(&form.password, &user.password_hash)?
    {
        return Err(AppError::unauthorized("Incorrect username or password").into());
    }

    let (access_token, _expires_at) = state
        .jwt_encoder
        .generate_token(&user.username, user.role)?;

    info!(username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: ProfileResponse {
            username: user.username,
            role: user.role,
        },
    }))
}

/// GET /api/user/profile
pub async fn profile(auth: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        username: auth.username.clone(),
        role: auth.role,
    })
}

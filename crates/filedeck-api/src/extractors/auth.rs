//! `AuthUser` extractor — pulls the JWT from the Authorization header,
//! validates it, and injects the live user record.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use filedeck_auth::user::model::User;
use filedeck_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user available in handlers.
///
/// The role comes from the user store, not the token, so demotions and
/// deletions take effect on the next request even though tokens are
/// stateless.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// Returns the inner user record.
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extract Bearer token from Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        // Decode and validate JWT
        let claims = state.jwt_decoder.decode(token)?;

        // The account must still exist
        let user = state
            .users
            .get(claims.username())
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        Ok(AuthUser(user))
    }
}

//! Bearer-credential authentication extractor for Axum handlers.
//!
//! Two credential kinds are accepted in `Authorization: Bearer <credential>`:
//! HS256 access tokens issued to the web dashboard, and the long-lived API
//! key the desktop client is configured with.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use grail_core::api_keys::{hash_api_key, looks_like_jwt};
use grail_core::error::CoreError;
use grail_core::types::DbId;
use grail_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// Resolve the bearer credential in `headers` to a user.
///
/// Access tokens are trusted on signature alone. API keys must match a
/// stored hash, so a rotated key stops working immediately.
pub async fn resolve_user(headers: &HeaderMap, state: &AppState) -> Result<AuthUser, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let credential = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

    if looks_like_jwt(credential) {
        let claims = validate_token(credential, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;
        return Ok(AuthUser { user_id: claims.sub });
    }

    let user = UserRepo::find_by_api_key_hash(&state.pool, &hash_api_key(credential))
        .await?
        .ok_or_else(|| unauthorized("Invalid API key"))?;

    Ok(AuthUser { user_id: user.id })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(&parts.headers, state).await
    }
}

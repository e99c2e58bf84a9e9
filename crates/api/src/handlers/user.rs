//! Handlers for the caller's own account settings.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use grail_core::api_keys::generate_api_key;
use grail_core::error::CoreError;
use grail_db::models::user::ApiKeyIssuedResponse;
use grail_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/user/api-key
///
/// Issue a new desktop-client API key, replacing any previous one. The
/// plaintext key is returned exactly once.
pub async fn rotate_api_key(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let generated = generate_api_key();

    UserRepo::set_api_key(&state.pool, auth.user_id, &generated.hash, &generated.prefix)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(
        user_id = auth.user_id,
        key_prefix = %generated.prefix,
        "API key rotated",
    );

    let response = ApiKeyIssuedResponse {
        key_prefix: generated.prefix,
        plaintext_key: generated.plaintext,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

//! Handlers for progress sync and retrieval.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use grail_core::error::CoreError;
use grail_core::progress::SyncSnapshot;
use grail_db::models::progress::GrailProgress;
use grail_db::repositories::ProgressRepo;
use serde::Serialize;

use crate::engine::sync;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{resolve_user, AuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body returned by a successful sync.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub message: &'static str,
    pub progress: GrailProgress,
    pub new_achievements: Vec<String>,
}

/// Body returned by the unlock check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockCheckResponse {
    pub should_unlock: bool,
}

/// POST /api/v1/progress/sync
///
/// Reconcile the desktop client's snapshot into the caller's progress.
pub async fn sync_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<SyncSnapshot>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(snapshot) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            let err = rejection_error(rejection);
            sync::record_rejected_payload(&state.pool, auth.user_id, &err).await;
            return Err(err);
        }
    };

    let outcome = sync::sync_progress(&state.pool, &state.catalog, auth.user_id, &snapshot).await?;

    tracing::info!(
        user_id = auth.user_id,
        new_achievements = outcome.new_achievements.len(),
        "Sync request completed",
    );

    Ok(Json(DataResponse {
        data: SyncResponse {
            message: "Progress synced successfully",
            progress: outcome.progress,
            new_achievements: outcome.new_achievements.into_iter().collect(),
        },
    }))
}

/// A body that parses as JSON but does not match the snapshot shape is a
/// validation failure. Anything else is a bad request.
fn rejection_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::Core(CoreError::Validation(e.body_text())),
        other => AppError::BadRequest(other.body_text()),
    }
}

/// GET /api/v1/progress
pub async fn get_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "GrailProgress",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/progress/unlock-check
///
/// Tells the desktop client whether it may let the user edit the grail
/// configuration locally. A credential that does not resolve to a user,
/// for any reason, means no server-side lock applies.
pub async fn unlock_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let locked = match resolve_user(&headers, &state).await {
        Ok(auth) => ProgressRepo::is_locked_for_user(&state.pool, auth.user_id).await?,
        Err(AppError::Core(CoreError::Unauthorized(_))) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Unlock check could not resolve credential");
            false
        }
    };

    Ok(Json(DataResponse {
        data: UnlockCheckResponse {
            should_unlock: !locked,
        },
    }))
}

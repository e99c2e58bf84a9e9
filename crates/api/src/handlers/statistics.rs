use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use grail_core::error::CoreError;
use grail_db::repositories::StatisticsRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/statistics
///
/// The caller's find rate and streaks. 404 until the first sync.
pub async fn get_statistics(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = StatisticsRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "UserStatistics",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: stats }))
}

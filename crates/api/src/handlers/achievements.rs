use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use grail_db::repositories::AchievementRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/achievements
///
/// The full catalog, including conditions.
pub async fn list_achievements(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let achievements = AchievementRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: achievements }))
}

/// GET /api/v1/achievements/mine
pub async fn list_my_achievements(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let unlocked = AchievementRepo::list_unlocked(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: unlocked }))
}

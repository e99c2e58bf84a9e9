use axum::routing::get;
use axum::Router;

use crate::handlers::achievements;
use crate::state::AppState;

/// Achievement routes mounted at `/achievements`.
///
/// ```text
/// GET /      -> list_achievements
/// GET /mine  -> list_my_achievements
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(achievements::list_achievements))
        .route("/mine", get(achievements::list_my_achievements))
}

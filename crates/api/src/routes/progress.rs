use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Progress routes mounted at `/progress`.
///
/// ```text
/// GET  /              -> get_progress
/// POST /sync          -> sync_progress
/// GET  /unlock-check  -> unlock_check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(progress::get_progress))
        .route("/sync", post(progress::sync_progress))
        .route("/unlock-check", get(progress::unlock_check))
}

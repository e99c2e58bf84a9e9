use axum::routing::post;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Account routes mounted at `/user`.
///
/// ```text
/// POST /api-key  -> rotate_api_key
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/api-key", post(user::rotate_api_key))
}

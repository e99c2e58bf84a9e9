use axum::routing::get;
use axum::Router;

use crate::handlers::statistics;
use crate::state::AppState;

/// Statistics routes mounted at `/statistics`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(statistics::get_statistics))
}

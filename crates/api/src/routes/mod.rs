pub mod achievements;
pub mod health;
pub mod progress;
pub mod statistics;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /progress                    caller's progress (GET)
/// /progress/sync               sync a client snapshot (POST)
/// /progress/unlock-check       may the client edit its configuration (GET)
///
/// /achievements                catalog (GET)
/// /achievements/mine           caller's unlocks (GET)
///
/// /statistics                  caller's statistics (GET)
///
/// /user/api-key                rotate desktop-client API key (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/progress", progress::router())
        .nest("/achievements", achievements::router())
        .nest("/statistics", statistics::router())
        .nest("/user", user::router())
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use grail_api::auth::jwt::JwtConfig;
use grail_api::config::ServerConfig;
use grail_api::engine::achievements::seed_default_achievements;
use grail_api::router::build_app_router;
use grail_api::state::AppState;
use grail_core::api_keys::generate_api_key;
use grail_core::catalog::ItemCatalog;
use grail_core::types::DbId;
use grail_db::models::user::CreateUser;
use grail_db::repositories::UserRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        item_catalog_path: None,
        seed_achievements: true,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over `pool` with the default item
/// catalog and the default achievement catalog seeded.
pub async fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_catalog(pool, ItemCatalog::default()).await
}

pub async fn build_test_app_with_catalog(pool: PgPool, catalog: ItemCatalog) -> Router {
    seed_default_achievements(&pool)
        .await
        .expect("seeding the achievement catalog should succeed");

    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog: Arc::new(catalog),
    };
    build_app_router(state, &config)
}

/// Create a user holding a fresh desktop-client API key.
///
/// Returns the user id and the plaintext key.
pub async fn create_user_with_key(pool: &PgPool, username: &str) -> (DbId, String) {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");

    let key = generate_api_key();
    UserRepo::set_api_key(pool, user.id, &key.hash, &key.prefix)
        .await
        .expect("setting the API key should succeed");

    (user.id, key.plaintext)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_raw_auth(app: Router, uri: &str, body: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

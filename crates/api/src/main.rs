use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use grail_core::catalog::ItemCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grail_api::config::ServerConfig;
use grail_api::engine::achievements::seed_default_achievements;
use grail_api::router::build_app_router;
use grail_api::server::serve_with_shutdown;
use grail_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grail_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Item catalog ---
    let catalog = match &config.item_catalog_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read item catalog '{path}': {e}"));
            ItemCatalog::from_json_str(&raw)
                .unwrap_or_else(|e| panic!("Invalid item catalog '{path}': {e}"))
        }
        None => ItemCatalog::default(),
    };
    tracing::info!(
        items = catalog.items.len(),
        total_runes = catalog.totals.runes,
        total_runewords = catalog.totals.runewords,
        "Item catalog loaded",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = grail_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    grail_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    grail_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    if config.seed_achievements {
        let seeded = seed_default_achievements(&pool)
            .await
            .expect("Failed to seed achievement catalog");
        tracing::info!(seeded, "Achievement catalog seeded");
    }

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog: Arc::new(catalog),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let outcome = serve_with_shutdown(listener, app, shutdown_signal(), drain_timeout)
        .await
        .expect("Server error");

    tracing::info!(?outcome, "Shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

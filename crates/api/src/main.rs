use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use floodwatch_api::config::ServerConfig;
use floodwatch_api::router::build_app_router;
use floodwatch_api::state::AppState;
use floodwatch_kv::{KvStore, MemoryStore, RedisStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "floodwatch_api=debug,floodwatch_upstream=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let acquire_timeout = Duration::from_secs(config.db_acquire_timeout_secs);
    let pool = floodwatch_db::create_pool(&database_url, acquire_timeout)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    floodwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    floodwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Cache / rate limit store ---
    let kv = connect_store(config.redis_url.as_deref()).await;

    // --- App state ---
    let state = AppState::new(pool, config.clone(), kv).expect("Failed to build HTTP client");

    // --- Router ---
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

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Redis when `REDIS_URL` is set and reachable, in-process memory otherwise.
async fn connect_store(redis_url: Option<&str>) -> Arc<dyn KvStore> {
    let Some(url) = redis_url else {
        tracing::info!("REDIS_URL not set, using in-memory cache and rate limiter");
        return Arc::new(MemoryStore::new());
    };

    match RedisStore::connect(url).await {
        Ok(store) => {
            tracing::info!("Connected to Redis");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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

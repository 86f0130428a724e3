use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hazard_api::config::ServerConfig;
use hazard_api::router::build_app_router;
use hazard_api::state::AppState;
use hazard_api::{background, ws};
use hazard_db::store::PgStore;
use hazard_pipeline::{OpenWeatherClient, OpenWeatherConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hazard_api=debug,hazard_pipeline=info,hazard_events=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        location = %config.monitor.location_name,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hazard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hazard_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    hazard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Telemetry provider ---
    if config.monitor.openweather_api_key.trim().is_empty() {
        tracing::warn!("OPENWEATHER_API_KEY is empty; monitoring cycles will fail until it is set");
    }
    let telemetry = OpenWeatherClient::new(OpenWeatherConfig {
        api_url: config.monitor.openweather_api_url.clone(),
        api_key: config.monitor.openweather_api_key.clone(),
        timeout: config.monitor.telemetry_timeout(),
    })
    .expect("Failed to build telemetry HTTP client");

    // --- App state ---
    let store = Arc::new(PgStore::new(pool.clone()));
    let state = AppState::build(config.clone(), store, Arc::new(telemetry), Some(pool));
    let ws_manager = Arc::clone(&state.ws_manager);

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), cancel.clone());
    let monitor_handle = tokio::spawn(background::weather_monitor::run(
        Arc::clone(&state.runner),
        config.monitor.interval(),
        cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Let an in-flight cycle finish its current step.
    cancel.cancel();
    let grace = config.monitor.telemetry_timeout() + Duration::from_secs(5);
    if tokio::time::timeout(grace, monitor_handle).await.is_err() {
        tracing::warn!("Weather monitor did not stop in time");
    }
    tracing::info!("Weather monitor stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    let _ = heartbeat_handle.await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
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

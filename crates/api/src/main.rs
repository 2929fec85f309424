use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use healthwatch_core::health::RuleSet;
use healthwatch_core::rate_limit::CommandRateLimiter;
use healthwatch_db::SqliteStore;
use healthwatch_events::{AlertBus, NotifyError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use healthwatch_api::background;
use healthwatch_api::config::{ConfigError, MonitorConfig, ServerConfig};
use healthwatch_api::router::build_app_router;
use healthwatch_api::state::AppState;

/// Anything that stops the server from starting.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("alert channel error: {0}")]
    Notify(#[from] NotifyError),

    #[error("invalid HOST address {0:?}")]
    Host(String),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "healthwatch_api=debug,healthwatch_monitor=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    let monitor_config = MonitorConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        interval_secs = monitor_config.probe_interval.as_secs(),
        timeout_secs = monitor_config.probe_timeout.as_secs(),
        cooldown_secs = monitor_config.command_cooldown.as_secs(),
        "Loaded monitor configuration"
    );

    let access = monitor_config.access_policy();
    if access.is_open() {
        tracing::warn!("ALLOWED_OWNER_IDS is empty, every owner may manage targets");
    }

    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|_| StartupError::Host(config.host.clone()))?;

    // --- Database ---
    let pool = healthwatch_db::create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    healthwatch_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    healthwatch_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let store = Arc::new(SqliteStore::new(pool.clone()));

    // --- Alerting ---
    let bus = Arc::new(AlertBus::default());
    let notifiers = background::alerts::build_notifiers(&monitor_config)?;
    let dispatcher_handle = background::alerts::spawn(&bus, notifiers);

    // --- Monitor loop ---
    let cancel = CancellationToken::new();
    let monitor_handle = background::monitor::spawn(
        Arc::clone(&store),
        Arc::clone(&bus),
        &monitor_config,
        cancel.clone(),
    );

    // --- App state ---
    let state = AppState {
        pool,
        store,
        config: Arc::new(config.clone()),
        rules: RuleSet::new(monitor_config.stale_after_chrono()),
        access: Arc::new(access),
        rate_limiter: Arc::new(CommandRateLimiter::new(monitor_config.command_cooldown)),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), monitor_handle).await;
    tracing::info!("Monitor scheduler stopped");

    // Dropping the last bus handle closes the channel and stops the dispatcher.
    drop(bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;
    tracing::info!("Alert dispatcher stopped");

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

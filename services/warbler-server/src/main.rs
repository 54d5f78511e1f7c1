//! Warbler server
//!
//! The deployable binary: loads layered configuration, connects and
//! migrates the database, and serves the API with graceful shutdown.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (dev platform)
//! warbler-server
//!
//! # Start with a config file
//! warbler-server --config /etc/warbler/config.toml
//!
//! # Start with environment overrides
//! WARBLER__SERVER__PORT=3000 warbler-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use warbler_api::{create_router, AppState, Platform};
use warbler_auth::AuthService;
use warbler_db::Database;

use crate::config::ServerConfig;

/// Warbler - a small social-post service
#[derive(Parser, Debug)]
#[command(name = "warbler-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "WARBLER_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "WARBLER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WARBLER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WARBLER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "WARBLER_LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Session-token signing secret
    #[arg(long, env = "TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,

    /// Billing webhook API key
    #[arg(long, env = "WEBHOOK_API_KEY", hide_env_values = true)]
    webhook_api_key: Option<String>,

    /// Deployment platform (dev, prod)
    #[arg(long, env = "WARBLER_PLATFORM")]
    platform: Option<String>,
}

/// How often the expired refresh-token sweep runs
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // CLI flags win over file and environment.
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(database_url) = args.database_url {
        server_config.database.url = database_url;
    }
    if let Some(token_secret) = args.token_secret {
        server_config.auth.token_secret = token_secret;
    }
    if let Some(webhook_api_key) = args.webhook_api_key {
        server_config.auth.webhook_api_key = webhook_api_key;
    }
    if let Some(platform) = args.platform {
        server_config.platform = platform;
    }
    if let Some(level) = args.log_level {
        server_config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        server_config.logging.format = format;
    }

    init_logging(&server_config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = %server_config.platform,
        "Starting Warbler server"
    );

    server_config.validate()?;
    let platform: Platform = server_config
        .platform
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    // Database
    let db = Arc::new(Database::connect(&server_config.to_db_config()).await?);
    if server_config.database.run_migrations {
        db.migrate().await?;
    }

    // Auth service and shared state
    let auth = Arc::new(AuthService::new(
        db.clone(),
        server_config.auth.to_auth_config(),
    ));
    let state = Arc::new(AppState::new(db.clone(), auth, platform));

    // Router
    let app = create_router(state, server_config.api.to_api_config());

    // Background sweep of expired refresh tokens
    tokio::spawn(sweep_expired_tokens(db));

    let addr = server_config.server.socket_addr()?;
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }
}

/// Periodically delete refresh-token rows past their expiry
async fn sweep_expired_tokens(db: Arc<Database>) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    // The first tick fires immediately; skip it so startup stays quiet.
    interval.tick().await;

    loop {
        interval.tick().await;
        match db.refresh_token_repo().delete_expired().await {
            Ok(0) => {}
            Ok(deleted) => tracing::info!(deleted, "swept expired refresh tokens"),
            Err(e) => tracing::warn!(error = %e, "expired-token sweep failed"),
        }
    }
}

/// Wait for ctrl-c or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

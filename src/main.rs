//! Query count submission service.
//!
//! Main entry point. Loads configuration, prepares the record store and the
//! webhook notifier, then serves HTTP until a shutdown signal arrives.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use querycount_api::{start_server, AppState, Config};
use querycount_core::storage::Repository;
use querycount_notify::Notifier;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// Time the notifier worker gets to flush queued jobs after the server stops.
const NOTIFIER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = Config::load()?;
    init_tracing(&config.rust_log);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) => info!(error = %e, "No environment file loaded"),
    }

    info!(
        database_url = %config.database_url_masked(),
        host = %config.host,
        port = config.port,
        static_dir = %config.static_dir.display(),
        webhook_enabled = config.webhook_enabled(),
        "Configuration loaded"
    );

    let pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    let repository = Repository::new(Arc::new(pool.clone()));
    repository.health_check().await.context("Failed to verify database connection")?;
    repository.ensure_schema().await.context("Failed to create submissions table")?;
    info!("Submissions table ready");

    let (notifier, notifier_worker) =
        Notifier::spawn(config.to_notifier_config()).context("Failed to start notifier")?;

    let state = AppState::new(Arc::new(repository), notifier);
    let addr = config.parse_server_addr()?;

    start_server(state, config.to_router_options(), addr).await.context("Server failed")?;

    if let Some(worker) = notifier_worker {
        match tokio::time::timeout(NOTIFIER_DRAIN_TIMEOUT, worker).await {
            Ok(Ok(())) => info!("Notifier stopped"),
            Ok(Err(e)) => warn!(error = %e, "Notifier worker panicked"),
            Err(_) => warn!("Notifier did not drain before timeout, dropping queued jobs"),
        }
    }

    pool.close().await;
    info!("Database connections closed");

    info!("Shutdown complete");
    Ok(())
}

/// Initializes tracing, preferring `RUST_LOG` over the configured filter.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    let mut retries = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) if retries < MAX_RETRIES => {
                retries += 1;
                warn!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    error = %e,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}

//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response tracing
//! 3. Timeout enforcement
//! 4. CORS handling (JSON routes only, no body size limit)
//! 5. Handler execution, or static files for unmatched paths
//!
//! # Graceful Shutdown
//!
//! On SIGINT or SIGTERM the server stops accepting connections and waits for
//! in-flight requests before returning.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    handlers,
    middleware::{cors_middleware, inject_request_id},
    AppState,
};

/// Path of the recent submissions listing.
pub const LIST_PATH: &str = "/api/queryCounts";
/// Path of the submission endpoint.
pub const CREATE_PATH: &str = "/api/queryCountCheck";

/// Router settings that are not part of the shared state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Directory served for unmatched paths.
    pub static_dir: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self { static_dir: PathBuf::from("."), request_timeout: Duration::from_secs(30) }
    }
}

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use querycount_api::{create_router, AppState, RouterOptions};
/// use querycount_core::storage::mock::MemoryStore;
/// use querycount_notify::Notifier;
///
/// let state = AppState::new(Arc::new(MemoryStore::new()), Notifier::disabled());
/// let app = create_router(state, &RouterOptions::default());
/// // Serve the app...
/// ```
pub fn create_router(state: AppState, options: &RouterOptions) -> Router {
    let api_routes = Router::new()
        .route(LIST_PATH, get(handlers::list_recent))
        .route(CREATE_PATH, post(handlers::create_submission))
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(cors_middleware));

    Router::new()
        .merge(api_routes)
        .fallback_service(ServeDir::new(&options.static_dir))
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound or the server
/// fails while running.
pub async fn start_server(
    state: AppState,
    options: RouterOptions,
    addr: SocketAddr,
) -> Result<(), std::io::Error> {
    let app = create_router(state, &options);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(
        static_dir = %options.static_dir.display(),
        "HTTP server listening on {}", actual_addr
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}

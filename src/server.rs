//! Context Store HTTP surface.
//!
//! Thin axum layer over [`ContextStore`](crate::evaluation::ContextStore):
//!
//! - `GET /health`
//! - `GET /api/demo-data`
//! - `GET /api/flags/:userId/:orgId`
//! - `GET /api/client-sdk-key`
//!
//! Cross-origin access is limited to the configured console origin. On Ctrl-C or
//! SIGTERM the server drains, then closes the provider handle before returning.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub mod routes;
pub mod state;

use crate::config::BridgeConfig;
use crate::error::ApiError;
use crate::provider::bootstrap::init_server_provider;
use routes::{catalog_handler, client_key_handler, flags_handler, health_handler};
pub use state::AppState;

/// Build the router for `state`, allowing cross-origin calls from `allowed_origin`.
pub fn router(state: Arc<AppState>, allowed_origin: &str) -> Result<Router, ApiError> {
    let origin = HeaderValue::from_str(allowed_origin).map_err(|e| {
        ApiError::ConfigError(format!("Invalid client URL '{}': {}", allowed_origin, e))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Ok(Router::new()
        .route("/health", get(health_handler))
        .route("/api/demo-data", get(catalog_handler))
        .route("/api/flags/:user_id/:org_id", get(flags_handler))
        .route("/api/client-sdk-key", get(client_key_handler))
        .layer(cors)
        .with_state(state))
}

/// Initialize the provider, bind, and serve until a shutdown signal arrives.
pub async fn start_server(config: &BridgeConfig) -> Result<(), ApiError> {
    info!("Initializing provider...");
    let provider = init_server_provider(&config.provider).await;
    if provider.is_none() {
        warn!("Running in fallback mode: every evaluation serves default values");
    }

    let state = AppState::with_provider(
        provider,
        config.provider.client_key().map(str::to_string),
    );

    let address = config.server.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on http://{address}");

    serve_on(listener, state, &config.server.client_url, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves, then close the
/// provider.
pub async fn serve_on<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    allowed_origin: &str,
    shutdown: F,
) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state.clone(), allowed_origin)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    if let Some(provider) = state.store.provider() {
        match provider.close().await {
            Ok(()) => info!("Provider client closed"),
            Err(e) => error!(error = %e, "Failed to close provider client"),
        }
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down gracefully..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

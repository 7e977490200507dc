//! Server setup and initialization
//!
//! Provides the application builder and the server runner.

use axum::Router;
use inbox_common::{AppConfig, AppError};
use inbox_service::Infrastructure;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::middleware::{apply_middleware, rate_limited};
use crate::routes::{create_router, public_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = rate_limited(create_router(), &config.rate_limit)?;
    let router = apply_middleware(
        api.merge(public_routes()),
        &config.api,
        &config.cors,
        config.app.env.is_production(),
    );
    Ok(router.with_state(state))
}

/// Connect to the backing services and build the state
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let infrastructure = Infrastructure::connect(&config).await?;
    let service_context = infrastructure.service_context(&config)?;
    Ok(AppState::new(service_context, config, infrastructure))
}

/// Serve until Ctrl-C or SIGTERM
pub async fn run_server(app: Router, address: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {address}: {e}")))?;

    info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;
    run_server(app, &address).await
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

//! Serve command - the discovery HTTP API

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router_with_metrics;
use crate::config::AppConfig;
use crate::infrastructure::observability::{init_metrics, init_tracing, shutdown_tracing};

/// Serves until Ctrl+C or SIGTERM, then drains in-flight requests
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging, &config.observability.tracing);

    let addr = config.server.socket_addr()?;
    let state = crate::create_app_state_with_config(&config).await?;
    let metrics_config = &config.observability.metrics;
    let app = create_router_with_metrics(state, init_metrics(metrics_config), &metrics_config.path);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "QEats discovery API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("QEats discovery API stopped");
    shutdown_tracing();

    Ok(())
}

/// Resolves on the first shutdown signal. A signal that cannot be
/// subscribed to is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!(error = %e, "Cannot listen for Ctrl+C");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    info!(signal = received, "Shutting down gracefully");
}

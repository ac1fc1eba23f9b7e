//! info-center relay binary
//!
//! Loads configuration, connects the bus and serves the relay until SIGINT or
//! SIGTERM.

use anyhow::Result;
use info_center::bus::{InMemoryBus, MessageBus, NatsBus};
use info_center::metrics::RelayMetrics;
use info_center::routes::{self, AppState};
use info_center::RelayConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first to get log level
    let relay_config = RelayConfig::from_env()?;

    // Initialize tracing with configured log level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("info_center={}", relay_config.log_level).parse()?)
                .add_directive("async_nats=warn".parse()?),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        http_port = relay_config.http_port,
        max_session_secs = relay_config.max_session_secs,
        "Starting info-center relay"
    );

    // Initialize metrics
    let metrics = Arc::new(RelayMetrics::install()?);
    info!("Prometheus metrics initialized");

    // Connect to NATS if configured
    let local_bus =
        || -> Arc<dyn MessageBus> { Arc::new(InMemoryBus::with_capacity(relay_config.bus_capacity)) };
    let bus: Arc<dyn MessageBus> = if let Some(ref url) = relay_config.nats_url {
        match NatsBus::connect(url).await {
            Ok(nats) => {
                info!(url, "Connected to NATS");
                nats as Arc<dyn MessageBus>
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to NATS - running in local mode");
                local_bus()
            }
        }
    } else {
        info!("No NATS_URL configured - running in local mode");
        local_bus()
    };
    metrics.set_bus_connected(bus.is_connected());

    let app_state = AppState::new(
        Arc::clone(&bus),
        Arc::clone(&metrics),
        relay_config.max_session(),
    );
    let shutdown = app_state.shutdown.clone();
    let app = routes::router(app_state);
    let addr: SocketAddr = ([0, 0, 0, 0], relay_config.http_port).into();

    info!(port = relay_config.http_port, bus = bus.kind(), "Starting HTTP server");

    let result = axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            // Ends every open stream so the server can drain
            shutdown.cancel();
        })
        .await;

    if let Err(ref e) = result {
        error!(error = %e, "HTTP server error");
    }

    // Graceful shutdown
    info!("Shutting down relay...");
    bus.close().await;

    info!("Relay shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

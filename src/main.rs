use std::path::PathBuf;

use profiles::config::Configuration;
use profiles::{app, initialize_state, telemetry};
use tokio::net::TcpListener;
use tracing_subscriber::util::SubscriberInitExt;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Installed first so a configuration fallback is reported.
    let (subscriber, log_bridge) = telemetry::subscriber(std::io::stdout);
    subscriber.init();

    let config = Configuration::default()
        .path(
            std::env::var(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_default(),
        )
        .read()?;

    // Export logs and traces only when a collector is configured.
    if let Some(endpoint) = config.telemetry.otlp_endpoint.as_deref() {
        opentelemetry::global::set_tracer_provider(telemetry::setup_tracer(
            endpoint,
        )
        .map_err(|err| err as Box<dyn std::error::Error>)?);
        log_bridge.reload(Some(
            telemetry::setup_logging(endpoint).map_err(|err| err as Box<dyn std::error::Error>)?,
        ))?;
    }

    let metrics = if config.telemetry.prometheus {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    let state = initialize_state(config.clone(), metrics).await?;

    let listener = TcpListener::bind(&config.address).await?;
    tracing::info!(address = %config.address, version = %config.version, "server started");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}

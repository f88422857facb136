//! Script Exporter CLI
//!
//! Loads configuration, runs the first collection cycle, then serves
//! `/metrics` while refreshing in the background.

use clap::Parser;
use script_exporter::{
    cache::{ResultStore, SharedCache},
    config::Cli,
    metrics::{ExporterMetrics, Exposition, MetricsServer, MetricsServerConfig, RenderOptions},
    scheduler::Scheduler,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => fail("Invalid configuration", e),
    };
    let labels = match config.label_set() {
        Ok(labels) => labels,
        Err(e) => fail("Invalid configuration", e),
    };

    info!("Script Exporter v{}", script_exporter::VERSION);
    info!(
        path = %config.path.display(),
        interval_secs = config.interval_secs,
        timeout_secs = config.timeout_secs,
        "Collecting scripts"
    );

    let metrics = match ExporterMetrics::new(config.prefix(), &labels) {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => fail("Failed to create metrics registry", e),
    };
    let store: Arc<dyn ResultStore> = Arc::new(SharedCache::new());
    let scheduler = Scheduler::from_config(&config, Arc::clone(&store), Arc::clone(&metrics));

    // The first cycle runs before the listener exists, so an empty script
    // directory stops the process without ever serving.
    if let Err(e) = scheduler.run_cycle().await {
        fail("Script discovery failed", e);
    }

    let exposition = Exposition::new(store, RenderOptions::new(config.prefix(), &labels), metrics);
    let server = MetricsServer::new(
        MetricsServerConfig {
            bind_addr: config.bind_addr(),
        },
        exposition,
    );

    tokio::select! {
        result = server.run(shutdown_signal()) => match result {
            Ok(()) => info!("Shut down"),
            Err(e) => fail("Failed to start server", e),
        },
        result = scheduler.run() => {
            if let Err(e) = result {
                fail("Script discovery failed", e);
            }
        }
    }
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}

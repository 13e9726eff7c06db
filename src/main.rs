//! tcp-importer Binary Entry Point
//!
//! Loads the job file, starts one worker per job and runs until every worker
//! has stopped or the process is asked to terminate.

use std::sync::Arc;

use clap::Parser;
use tcp_importer::{
    AppConfig, HttpFetcher, TcpForwarder, WorkerRegistry, config::DEFAULT_CONFIG_FILE,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// tcp-importer - scrape exposition endpoints and ship samples over TCP
#[derive(Parser, Debug)]
#[command(name = "tcp-importer", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_FILE,
        env = "TCP_IMPORTER_CONFIG"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tcp_importer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config);
    let config = AppConfig::load(&cli.config)?;
    let jobs = config.jobs()?;

    tracing::info!(
        "Defaults: interval={}s, tcp={}, type={}",
        config.interval,
        config.tcp,
        config.kind,
    );

    let registry = WorkerRegistry::new(
        Arc::new(HttpFetcher::new()?),
        Arc::new(TcpForwarder::new()),
    );
    for job in jobs {
        registry.activate(job).await?;
    }
    tracing::info!("{} jobs active", registry.job_count().await);
    tracing::info!("Press Ctrl+C to shutdown");

    let signalled = tokio::select! {
        _ = registry.wait() => false,
        _ = shutdown_signal() => true,
    };

    if signalled {
        tracing::info!("Shutting down workers...");
        if let Err(e) = registry.shutdown().await {
            tracing::error!("Failed to shutdown workers: {}", e);
        }
    } else {
        tracing::info!("All workers stopped");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

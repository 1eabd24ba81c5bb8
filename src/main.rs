use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use multiswap::config::AppConfig;
use multiswap::metrics::{init_tracing_with_metrics, MetricsCollector};
use tracing::{info, warn};

/// Usage: `multiswap [CONFIG]`
///
/// Without a path the local development configuration is used.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => multiswap::load_config(&path)?,
        None => AppConfig::local(),
    };

    let collector = Arc::new(MetricsCollector::new());
    init_tracing_with_metrics(
        &config.logging.level,
        config.logging.json,
        Arc::clone(&collector),
    )
    .context("initializing tracing")?;

    let runtime = multiswap::from_config_with_collector(&config, collector)?;

    info!(engine = %runtime.engine.address(), "multiswap started");

    match runtime.metrics_server {
        Some(server) => {
            server
                .serve_with_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await
                .context("metrics server")?;
        }
        None => {
            warn!("metrics disabled; waiting for ctrl-c");
            tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
        }
    }

    info!("multiswap stopped");
    Ok(())
}

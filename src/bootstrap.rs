//! Wiring a running engine from configuration

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use multiswap_config::{validate_config, AppConfig, ConfigLoader, ENV_PREFIX};
use multiswap_metrics::{MetricsCollector, MetricsServer};
use multiswap_settlement::SettlementEngine;
use tracing::info;

/// An engine together with the metrics attached to it
pub struct Runtime {
    pub engine: Arc<SettlementEngine>,
    pub collector: Arc<MetricsCollector>,
    /// Present when metrics are enabled in configuration
    pub metrics_server: Option<MetricsServer>,
}

/// Load configuration from `path` with `MULTISWAP_*` environment overrides,
/// then validate it
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let config = ConfigLoader::from_file_with_env(path, ENV_PREFIX)
        .with_context(|| format!("loading config from {}", path.display()))?;
    validate_config(&config).context("validating config")?;
    Ok(config)
}

/// Build an engine from configuration, reporting to `collector`
pub fn build_engine(config: &AppConfig, collector: Arc<MetricsCollector>) -> Result<SettlementEngine> {
    let engine = &config.engine;
    let built = SettlementEngine::builder(
        engine.address.as_str(),
        engine.controller.as_str(),
        engine.fee_recipient.as_str(),
    )
    .fee_rate_bps(engine.fee_rate_bps)
    .paused(engine.start_paused)
    .observer(collector.clone())
    .build()
    .context("building settlement engine")?;

    collector.set_paused(engine.start_paused);
    Ok(built)
}

/// Validate `config` and build everything it describes
///
/// Exchanges are registered on the returned engine by the host.
pub fn from_config(config: &AppConfig) -> Result<Runtime> {
    from_config_with_collector(config, Arc::new(MetricsCollector::new()))
}

/// Like [`from_config`], reporting to an existing collector
pub fn from_config_with_collector(
    config: &AppConfig,
    collector: Arc<MetricsCollector>,
) -> Result<Runtime> {
    validate_config(config).context("validating config")?;

    let engine = Arc::new(build_engine(config, collector.clone())?);

    let metrics_server = config.metrics.enabled.then(|| {
        MetricsServer::new(collector.clone(), config.metrics.listen_addr.clone())
            .with_engine(engine.clone())
    });

    info!(
        engine = %engine.address(),
        controller = %config.engine.controller,
        fee_rate_bps = config.engine.fee_rate_bps,
        paused = config.engine.start_paused,
        metrics = config.metrics.enabled,
        "engine ready"
    );

    Ok(Runtime {
        engine,
        collector,
        metrics_server,
    })
}

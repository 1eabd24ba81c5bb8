use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::collector::MetricsCollector;

/// Initialize tracing without metrics
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str, json: bool) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(json.then(|| fmt::layer().with_target(true).json()))
        .with((!json).then(|| fmt::layer().with_target(true)))
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))
}

/// Initialize tracing with metrics integration
///
/// Same as [`init_tracing`], plus a [`LogMetricsLayer`] counting warnings
/// and errors into `collector`.
pub fn init_tracing_with_metrics(
    level: &str,
    json: bool,
    collector: Arc<MetricsCollector>,
) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(json.then(|| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json()
        }))
        .with((!json).then(|| fmt::layer().with_target(true)))
        .with(LogMetricsLayer::new(collector))
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))
}

fn env_filter(level: &str) -> Result<EnvFilter, TracingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|e| TracingError::FilterError(e.to_string())),
    }
}

/// Tracing layer that counts warning and error events
pub struct LogMetricsLayer {
    collector: Arc<MetricsCollector>,
}

impl LogMetricsLayer {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }
}

impl<S> Layer<S> for LogMetricsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level == Level::WARN || level == Level::ERROR {
            self.collector.record_log_event(level);
        }
    }
}

/// Tracing error types
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("tracing initialization error: {0}")]
    InitError(String),
    #[error("invalid log filter: {0}")]
    FilterError(String),
}
